// src/repositories/film_repository.rs
//
// Films, the film_fans like table and the derived popularity counter.
//
// Popularity is never incremented in place: every like/unlike recomputes it
// from the fan table inside the same transaction as the edge write.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use super::{date_from_sql, date_to_sql, GenreRepository, RatingRepository};
use crate::db::ConnectionPool;
use crate::domain::{dedup_genres_by_id, Film, Rating};
use crate::error::{AppError, AppResult};

const FILM_COLUMNS: &str =
    "film_id, name, description, release_date, duration, rating_id, popularity";

#[cfg_attr(test, mockall::automock)]
pub trait FilmRepository: Send + Sync {
    /// Insert a film after checking its rating and genres exist. Duplicate
    /// genre ids are collapsed. Returns the stored film with its generated id.
    fn save(&self, film: &Film) -> AppResult<Film>;
    /// Plain batch insert of film rows for seeding: no reference pre-checks
    /// and no genre links.
    fn save_many(&self, films: &[Film]) -> AppResult<Vec<Film>>;
    /// Update the film row by id. Genres and popularity are not touched.
    fn update(&self, film: &Film) -> AppResult<bool>;
    fn find_by_id(&self, id: i64) -> AppResult<Option<Film>>;
    /// Row lookup only; rating and genres are not loaded
    fn exists_by_id(&self, id: i64) -> AppResult<bool>;
    fn find_by_name(&self, name: &str) -> AppResult<Option<Film>>;
    fn find_id_by_name(&self, name: &str) -> AppResult<Option<i64>>;
    fn find_by_name_description_release_date_and_duration(
        &self,
        name: &str,
        description: &str,
        release_date: NaiveDate,
        duration: i32,
    ) -> AppResult<Option<Film>>;
    fn find_all(&self) -> AppResult<Vec<Film>>;
    fn delete_by_id(&self, id: i64) -> AppResult<bool>;
    fn delete_all(&self) -> AppResult<bool>;

    /// Returns false when the user already liked the film.
    fn add_like(&self, film_id: i64, user_id: i64) -> AppResult<bool>;
    /// Returns false when there was no like to remove.
    fn remove_like(&self, film_id: i64, user_id: i64) -> AppResult<bool>;
    /// Most liked films first; equal popularity falls back to id order
    fn get_top_by_likes(&self, count: usize) -> AppResult<Vec<Film>>;
    fn find_fans_ids(&self, film_id: i64) -> AppResult<Vec<i64>>;
    fn exists_like(&self, film_id: i64, user_id: i64) -> AppResult<bool>;
}

pub struct SqliteFilmRepository {
    pool: Arc<ConnectionPool>,
    rating_repo: Arc<dyn RatingRepository>,
    genre_repo: Arc<dyn GenreRepository>,
}

impl SqliteFilmRepository {
    pub fn new(
        pool: Arc<ConnectionPool>,
        rating_repo: Arc<dyn RatingRepository>,
        genre_repo: Arc<dyn GenreRepository>,
    ) -> Self {
        Self {
            pool,
            rating_repo,
            genre_repo,
        }
    }

    /// Map a films row. The rating carries only its id and genres are empty
    /// until the film is hydrated.
    fn row_to_film(row: &Row) -> Result<Film, rusqlite::Error> {
        let release_date_str: String = row.get("release_date")?;

        Ok(Film {
            id: row.get("film_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            release_date: date_from_sql(3, &release_date_str)?,
            duration: row.get("duration")?,
            rating: Rating::with_id(row.get("rating_id")?),
            popularity: row.get("popularity")?,
            genres: Vec::new(),
        })
    }

    fn query_films(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> AppResult<Vec<Film>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(sql)?;

        let films: Vec<Film> = stmt
            .query_map(params, Self::row_to_film)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(films)
    }

    fn query_one(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> AppResult<Option<Film>> {
        let film = {
            let conn = self.pool.get()?;
            let mut stmt = conn.prepare(sql)?;
            let row = stmt.query_row(params, Self::row_to_film).optional()?;
            row
        };

        film.map(|f| self.hydrate_one(f)).transpose()
    }

    /// Resolve rating and genres of a single film, one lookup each.
    fn hydrate_one(&self, mut film: Film) -> AppResult<Film> {
        film.rating = self
            .rating_repo
            .find_by_id(film.rating.id)?
            .ok_or_else(|| dangling_rating(film.id, film.rating.id))?;
        film.genres = self.genre_repo.find_genres_for_film(film.id)?;
        Ok(film)
    }

    /// Resolve ratings and genres for a whole result set with one query per
    /// table instead of two per film.
    fn hydrate_many(&self, mut films: Vec<Film>) -> AppResult<Vec<Film>> {
        if films.is_empty() {
            return Ok(films);
        }

        let ratings: HashMap<i64, Rating> = self
            .rating_repo
            .find_all()?
            .into_iter()
            .map(|r| (r.id, r))
            .collect();

        let film_ids: Vec<i64> = films.iter().map(|f| f.id).collect();
        let mut genres = self.genre_repo.find_genres_for_films(&film_ids)?;

        for film in films.iter_mut() {
            film.rating = ratings
                .get(&film.rating.id)
                .cloned()
                .ok_or_else(|| dangling_rating(film.id, film.rating.id))?;
            film.genres = genres.remove(&film.id).unwrap_or_default();
        }

        Ok(films)
    }

    fn refresh_popularity(conn: &Connection, film_id: i64) -> AppResult<()> {
        conn.execute(
            "UPDATE films
             SET popularity = (SELECT COUNT(*) FROM film_fans WHERE film_id = ?1)
             WHERE film_id = ?1",
            params![film_id],
        )?;
        Ok(())
    }
}

fn dangling_rating(film_id: i64, rating_id: i64) -> AppError {
    AppError::Other(format!(
        "Film {} references missing rating {}",
        film_id, rating_id
    ))
}

impl FilmRepository for SqliteFilmRepository {
    fn save(&self, film: &Film) -> AppResult<Film> {
        let rating = self.rating_repo.find_by_id(film.rating.id)?.ok_or_else(|| {
            AppError::InvalidReference(format!(
                "Rating with id {} does not exist",
                film.rating.id
            ))
        })?;

        let unique_genres = dedup_genres_by_id(&film.genres);
        for genre in &unique_genres {
            if self.genre_repo.find_by_id(genre.id)?.is_none() {
                return Err(AppError::InvalidReference(format!(
                    "Genre with id {} does not exist",
                    genre.id
                )));
            }
        }

        let id = {
            let conn = self.pool.get()?;
            conn.execute(
                "INSERT INTO films (name, description, release_date, duration, rating_id, popularity)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0)",
                params![
                    film.name,
                    film.description,
                    date_to_sql(film.release_date),
                    film.duration,
                    rating.id,
                ],
            )?;
            conn.last_insert_rowid()
        };

        let genres = if unique_genres.is_empty() {
            Vec::new()
        } else {
            self.genre_repo.add(id, &unique_genres)?
        };

        info!("Saved film '{}' with id {} ({} genres)", film.name, id, genres.len());

        Ok(Film {
            id,
            rating,
            popularity: 0,
            genres,
            ..film.clone()
        })
    }

    fn save_many(&self, films: &[Film]) -> AppResult<Vec<Film>> {
        if films.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let mut saved = Vec::with_capacity(films.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO films (name, description, release_date, duration, rating_id, popularity)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0)",
            )?;
            for film in films {
                stmt.execute(params![
                    film.name,
                    film.description,
                    date_to_sql(film.release_date),
                    film.duration,
                    film.rating.id,
                ])?;
                saved.push(Film {
                    id: tx.last_insert_rowid(),
                    popularity: 0,
                    genres: Vec::new(),
                    ..film.clone()
                });
            }
        }
        tx.commit()?;

        debug!("Batch-inserted {} films", saved.len());
        Ok(saved)
    }

    fn update(&self, film: &Film) -> AppResult<bool> {
        let conn = self.pool.get()?;

        let rows_affected = conn.execute(
            "UPDATE films
             SET name = ?1, description = ?2, release_date = ?3, duration = ?4, rating_id = ?5
             WHERE film_id = ?6",
            params![
                film.name,
                film.description,
                date_to_sql(film.release_date),
                film.duration,
                film.rating.id,
                film.id,
            ],
        )?;

        Ok(rows_affected > 0)
    }

    fn find_by_id(&self, id: i64) -> AppResult<Option<Film>> {
        let sql = format!("SELECT {} FROM films WHERE film_id = ?1", FILM_COLUMNS);
        self.query_one(&sql, &[&id])
    }

    fn exists_by_id(&self, id: i64) -> AppResult<bool> {
        let conn = self.pool.get()?;

        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM films WHERE film_id = ?1)",
            params![id],
            |row| row.get(0),
        )?;

        Ok(exists)
    }

    fn find_by_name(&self, name: &str) -> AppResult<Option<Film>> {
        let sql = format!(
            "SELECT {} FROM films WHERE name = ?1 ORDER BY film_id LIMIT 1",
            FILM_COLUMNS
        );
        self.query_one(&sql, &[&name])
    }

    fn find_id_by_name(&self, name: &str) -> AppResult<Option<i64>> {
        let conn = self.pool.get()?;

        let id = conn
            .query_row(
                "SELECT film_id FROM films WHERE name = ?1 ORDER BY film_id LIMIT 1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        Ok(id)
    }

    fn find_by_name_description_release_date_and_duration(
        &self,
        name: &str,
        description: &str,
        release_date: NaiveDate,
        duration: i32,
    ) -> AppResult<Option<Film>> {
        let sql = format!(
            "SELECT {} FROM films
             WHERE name = ?1 AND description = ?2 AND release_date = ?3 AND duration = ?4
             ORDER BY film_id LIMIT 1",
            FILM_COLUMNS
        );
        let release_date = date_to_sql(release_date);
        self.query_one(&sql, &[&name, &description, &release_date, &duration])
    }

    fn find_all(&self) -> AppResult<Vec<Film>> {
        let sql = format!("SELECT {} FROM films ORDER BY film_id", FILM_COLUMNS);
        let films = self.query_films(&sql, &[])?;
        self.hydrate_many(films)
    }

    fn delete_by_id(&self, id: i64) -> AppResult<bool> {
        let conn = self.pool.get()?;
        let rows_affected = conn.execute("DELETE FROM films WHERE film_id = ?1", params![id])?;
        Ok(rows_affected > 0)
    }

    fn delete_all(&self) -> AppResult<bool> {
        let conn = self.pool.get()?;
        let rows_affected = conn.execute("DELETE FROM films", [])?;
        Ok(rows_affected > 0)
    }

    fn add_like(&self, film_id: i64, user_id: i64) -> AppResult<bool> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let inserted = tx.execute(
            "INSERT INTO film_fans (film_id, user_id) VALUES (?1, ?2)
             ON CONFLICT (film_id, user_id) DO NOTHING",
            params![film_id, user_id],
        )?;
        Self::refresh_popularity(&tx, film_id)?;

        tx.commit()?;

        debug!("User {} liked film {} (new like: {})", user_id, film_id, inserted > 0);
        Ok(inserted > 0)
    }

    fn remove_like(&self, film_id: i64, user_id: i64) -> AppResult<bool> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let removed = tx.execute(
            "DELETE FROM film_fans WHERE film_id = ?1 AND user_id = ?2",
            params![film_id, user_id],
        )?;
        if removed > 0 {
            Self::refresh_popularity(&tx, film_id)?;
        }

        tx.commit()?;

        debug!("User {} unliked film {} (removed: {})", user_id, film_id, removed > 0);
        Ok(removed > 0)
    }

    fn get_top_by_likes(&self, count: usize) -> AppResult<Vec<Film>> {
        let sql = format!(
            "SELECT {} FROM films ORDER BY popularity DESC, film_id ASC LIMIT ?1",
            FILM_COLUMNS
        );
        let limit = i64::try_from(count).unwrap_or(i64::MAX);
        let films = self.query_films(&sql, &[&limit])?;
        self.hydrate_many(films)
    }

    fn find_fans_ids(&self, film_id: i64) -> AppResult<Vec<i64>> {
        let conn = self.pool.get()?;

        let mut stmt =
            conn.prepare("SELECT user_id FROM film_fans WHERE film_id = ?1 ORDER BY user_id")?;

        let ids: Vec<i64> = stmt
            .query_map(params![film_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ids)
    }

    fn exists_like(&self, film_id: i64, user_id: i64) -> AppResult<bool> {
        let conn = self.pool.get()?;

        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM film_fans WHERE film_id = ?1 AND user_id = ?2)",
            params![film_id, user_id],
            |row| row.get(0),
        )?;

        Ok(exists)
    }
}
