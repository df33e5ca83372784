// src/repositories/genre_repository.rs
//
// Genre lookup table and the film_genre join table

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

use crate::db::ConnectionPool;
use crate::domain::Genre;
use crate::error::{AppError, AppResult};

/// Upper bound on bound parameters per `IN (...)` query.
const MAX_IN_PARAMS: usize = 500;

#[cfg_attr(test, mockall::automock)]
pub trait GenreRepository: Send + Sync {
    fn save(&self, genre: &Genre) -> AppResult<Genre>;
    fn save_many(&self, genres: &[Genre]) -> AppResult<Vec<Genre>>;
    fn update(&self, genre: &Genre) -> AppResult<bool>;
    fn find_by_id(&self, id: i64) -> AppResult<Option<Genre>>;
    fn find_by_name(&self, name: &str) -> AppResult<Option<Genre>>;
    fn find_id_by_name(&self, name: &str) -> AppResult<Option<i64>>;
    fn find_all(&self) -> AppResult<Vec<Genre>>;
    /// Deleting a genre that is still linked to a film is a constraint
    /// violation.
    fn delete_by_id(&self, id: i64) -> AppResult<bool>;
    fn delete_all(&self) -> AppResult<bool>;

    /// Link genres to a film and return the film's current genre list.
    /// Pairs that are already linked are left as they are.
    fn add(&self, film_id: i64, genres: &[Genre]) -> AppResult<Vec<Genre>>;
    /// Genres of one film ordered by id; empty when the film has none
    fn find_genres_for_film(&self, film_id: i64) -> AppResult<Vec<Genre>>;
    /// Genres for several films at once, keyed by film id. Films without
    /// genres have no entry.
    fn find_genres_for_films(&self, film_ids: &[i64]) -> AppResult<HashMap<i64, Vec<Genre>>>;
    /// Unlink every genre from a film; returns the number of links removed
    fn remove_all_for_film(&self, film_id: i64) -> AppResult<usize>;
}

pub struct SqliteGenreRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteGenreRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn row_to_genre(row: &Row) -> Result<Genre, rusqlite::Error> {
        Ok(Genre {
            id: row.get("genre_id")?,
            name: row.get("name")?,
        })
    }
}

impl GenreRepository for SqliteGenreRepository {
    fn save(&self, genre: &Genre) -> AppResult<Genre> {
        let conn = self.pool.get()?;

        conn.execute("INSERT INTO genres (name) VALUES (?1)", params![genre.name])?;
        let id = conn.last_insert_rowid();

        debug!("Saved genre '{}' with id {}", genre.name, id);

        Ok(Genre {
            id,
            name: genre.name.clone(),
        })
    }

    fn save_many(&self, genres: &[Genre]) -> AppResult<Vec<Genre>> {
        if genres.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let mut saved = Vec::with_capacity(genres.len());
        {
            let mut stmt = tx.prepare("INSERT INTO genres (name) VALUES (?1)")?;
            for genre in genres {
                stmt.execute(params![genre.name])?;
                saved.push(Genre {
                    id: tx.last_insert_rowid(),
                    name: genre.name.clone(),
                });
            }
        }
        tx.commit()?;

        debug!("Batch-inserted {} genres", saved.len());
        Ok(saved)
    }

    fn update(&self, genre: &Genre) -> AppResult<bool> {
        let conn = self.pool.get()?;

        let rows_affected = conn.execute(
            "UPDATE genres SET name = ?1 WHERE genre_id = ?2",
            params![genre.name, genre.id],
        )?;

        Ok(rows_affected > 0)
    }

    fn find_by_id(&self, id: i64) -> AppResult<Option<Genre>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare("SELECT genre_id, name FROM genres WHERE genre_id = ?1")?;

        match stmt.query_row(params![id], Self::row_to_genre) {
            Ok(genre) => Ok(Some(genre)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    fn find_by_name(&self, name: &str) -> AppResult<Option<Genre>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare("SELECT genre_id, name FROM genres WHERE name = ?1")?;

        match stmt.query_row(params![name], Self::row_to_genre) {
            Ok(genre) => Ok(Some(genre)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    fn find_id_by_name(&self, name: &str) -> AppResult<Option<i64>> {
        let conn = self.pool.get()?;

        let id = conn
            .query_row(
                "SELECT genre_id FROM genres WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        Ok(id)
    }

    fn find_all(&self) -> AppResult<Vec<Genre>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare("SELECT genre_id, name FROM genres ORDER BY genre_id")?;

        let genres: Vec<Genre> = stmt
            .query_map([], Self::row_to_genre)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(genres)
    }

    fn delete_by_id(&self, id: i64) -> AppResult<bool> {
        let conn = self.pool.get()?;
        let rows_affected = conn.execute("DELETE FROM genres WHERE genre_id = ?1", params![id])?;
        Ok(rows_affected > 0)
    }

    fn delete_all(&self) -> AppResult<bool> {
        let conn = self.pool.get()?;
        let rows_affected = conn.execute("DELETE FROM genres", [])?;
        Ok(rows_affected > 0)
    }

    fn add(&self, film_id: i64, genres: &[Genre]) -> AppResult<Vec<Genre>> {
        {
            let mut conn = self.pool.get()?;
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO film_genre (film_id, genre_id) VALUES (?1, ?2)
                     ON CONFLICT (film_id, genre_id) DO NOTHING",
                )?;
                for genre in genres {
                    stmt.execute(params![film_id, genre.id])?;
                }
            }
            tx.commit()?;
        }

        debug!("Linked {} genres to film {}", genres.len(), film_id);
        self.find_genres_for_film(film_id)
    }

    fn find_genres_for_film(&self, film_id: i64) -> AppResult<Vec<Genre>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT DISTINCT g.genre_id, g.name
             FROM film_genre AS fg
             JOIN genres AS g ON fg.genre_id = g.genre_id
             WHERE fg.film_id = ?1
             ORDER BY g.genre_id",
        )?;

        let genres: Vec<Genre> = stmt
            .query_map(params![film_id], Self::row_to_genre)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(genres)
    }

    fn find_genres_for_films(&self, film_ids: &[i64]) -> AppResult<HashMap<i64, Vec<Genre>>> {
        let mut by_film: HashMap<i64, Vec<Genre>> = HashMap::new();
        if film_ids.is_empty() {
            return Ok(by_film);
        }

        let conn = self.pool.get()?;

        for chunk in film_ids.chunks(MAX_IN_PARAMS) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!(
                "SELECT DISTINCT fg.film_id, g.genre_id, g.name
                 FROM film_genre AS fg
                 JOIN genres AS g ON fg.genre_id = g.genre_id
                 WHERE fg.film_id IN ({})
                 ORDER BY fg.film_id, g.genre_id",
                placeholders
            );

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                Ok((row.get::<_, i64>("film_id")?, Self::row_to_genre(row)?))
            })?;

            for row in rows {
                let (film_id, genre) = row?;
                by_film.entry(film_id).or_default().push(genre);
            }
        }

        Ok(by_film)
    }

    fn remove_all_for_film(&self, film_id: i64) -> AppResult<usize> {
        let conn = self.pool.get()?;
        let removed = conn.execute("DELETE FROM film_genre WHERE film_id = ?1", params![film_id])?;
        Ok(removed)
    }
}
