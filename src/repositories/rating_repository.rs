// src/repositories/rating_repository.rs
//
// MPA rating lookup table

use std::sync::Arc;

use log::debug;
use rusqlite::{params, OptionalExtension, Row};

use crate::db::ConnectionPool;
use crate::domain::Rating;
use crate::error::{AppError, AppResult};

#[cfg_attr(test, mockall::automock)]
pub trait RatingRepository: Send + Sync {
    /// Insert and return the rating with its generated id
    fn save(&self, rating: &Rating) -> AppResult<Rating>;
    /// Batch insert; no uniqueness check beyond the engine's
    fn save_many(&self, ratings: &[Rating]) -> AppResult<Vec<Rating>>;
    fn update(&self, rating: &Rating) -> AppResult<bool>;
    fn find_by_id(&self, id: i64) -> AppResult<Option<Rating>>;
    fn find_by_name(&self, name: &str) -> AppResult<Option<Rating>>;
    fn find_id_by_name(&self, name: &str) -> AppResult<Option<i64>>;
    fn find_all(&self) -> AppResult<Vec<Rating>>;
    fn delete_by_id(&self, id: i64) -> AppResult<bool>;
    fn delete_all(&self) -> AppResult<bool>;
}

pub struct SqliteRatingRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteRatingRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn row_to_rating(row: &Row) -> Result<Rating, rusqlite::Error> {
        Ok(Rating {
            id: row.get("rating_id")?,
            name: row.get("name")?,
        })
    }
}

impl RatingRepository for SqliteRatingRepository {
    fn save(&self, rating: &Rating) -> AppResult<Rating> {
        let conn = self.pool.get()?;

        conn.execute("INSERT INTO ratings (name) VALUES (?1)", params![rating.name])?;
        let id = conn.last_insert_rowid();

        debug!("Saved rating '{}' with id {}", rating.name, id);

        Ok(Rating {
            id,
            name: rating.name.clone(),
        })
    }

    fn save_many(&self, ratings: &[Rating]) -> AppResult<Vec<Rating>> {
        if ratings.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let mut saved = Vec::with_capacity(ratings.len());
        {
            let mut stmt = tx.prepare("INSERT INTO ratings (name) VALUES (?1)")?;
            for rating in ratings {
                stmt.execute(params![rating.name])?;
                saved.push(Rating {
                    id: tx.last_insert_rowid(),
                    name: rating.name.clone(),
                });
            }
        }
        tx.commit()?;

        debug!("Batch-inserted {} ratings", saved.len());
        Ok(saved)
    }

    fn update(&self, rating: &Rating) -> AppResult<bool> {
        let conn = self.pool.get()?;

        let rows_affected = conn.execute(
            "UPDATE ratings SET name = ?1 WHERE rating_id = ?2",
            params![rating.name, rating.id],
        )?;

        Ok(rows_affected > 0)
    }

    fn find_by_id(&self, id: i64) -> AppResult<Option<Rating>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare("SELECT rating_id, name FROM ratings WHERE rating_id = ?1")?;

        match stmt.query_row(params![id], Self::row_to_rating) {
            Ok(rating) => Ok(Some(rating)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    fn find_by_name(&self, name: &str) -> AppResult<Option<Rating>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare("SELECT rating_id, name FROM ratings WHERE name = ?1")?;

        match stmt.query_row(params![name], Self::row_to_rating) {
            Ok(rating) => Ok(Some(rating)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    fn find_id_by_name(&self, name: &str) -> AppResult<Option<i64>> {
        let conn = self.pool.get()?;

        let id = conn
            .query_row(
                "SELECT rating_id FROM ratings WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        Ok(id)
    }

    fn find_all(&self) -> AppResult<Vec<Rating>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare("SELECT rating_id, name FROM ratings ORDER BY rating_id")?;

        let ratings: Vec<Rating> = stmt
            .query_map([], Self::row_to_rating)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ratings)
    }

    fn delete_by_id(&self, id: i64) -> AppResult<bool> {
        let conn = self.pool.get()?;
        let rows_affected = conn.execute("DELETE FROM ratings WHERE rating_id = ?1", params![id])?;
        Ok(rows_affected > 0)
    }

    fn delete_all(&self) -> AppResult<bool> {
        let conn = self.pool.get()?;
        let rows_affected = conn.execute("DELETE FROM ratings", [])?;
        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    #[test]
    fn test_save_assigns_generated_id() {
        let (_dir, pool) = create_test_pool();
        let repo = SqliteRatingRepository::new(pool);

        let g = repo.save(&Rating::new("G")).unwrap();
        let pg = repo.save(&Rating::new("PG")).unwrap();

        assert!(g.id > 0);
        assert_eq!(pg.id, g.id + 1);
        assert_eq!(repo.find_by_id(pg.id).unwrap(), Some(pg));
    }

    #[test]
    fn test_duplicate_name_is_constraint_violation() {
        let (_dir, pool) = create_test_pool();
        let repo = SqliteRatingRepository::new(pool);

        repo.save(&Rating::new("R")).unwrap();
        let err = repo.save(&Rating::new("R")).unwrap_err();

        assert!(err.is_constraint_violation());
    }

    #[test]
    fn test_save_many_returns_ids_in_input_order() {
        let (_dir, pool) = create_test_pool();
        let repo = SqliteRatingRepository::new(pool);

        let saved = repo
            .save_many(&[Rating::new("G"), Rating::new("PG"), Rating::new("PG-13")])
            .unwrap();

        let names: Vec<&str> = saved.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["G", "PG", "PG-13"]);
        assert_eq!(repo.find_all().unwrap(), saved);
        assert!(repo.save_many(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_find_misses_return_none() {
        let (_dir, pool) = create_test_pool();
        let repo = SqliteRatingRepository::new(pool);
        repo.save(&Rating::new("G")).unwrap();

        assert_eq!(repo.find_by_id(99).unwrap(), None);
        assert_eq!(repo.find_by_name("NC-17").unwrap(), None);
        assert_eq!(repo.find_id_by_name("NC-17").unwrap(), None);
        assert!(repo.find_id_by_name("G").unwrap().is_some());
    }

    #[test]
    fn test_update_and_delete_report_affected_rows() {
        let (_dir, pool) = create_test_pool();
        let repo = SqliteRatingRepository::new(pool);
        let saved = repo.save(&Rating::new("PG13")).unwrap();

        let renamed = Rating {
            id: saved.id,
            name: "PG-13".to_string(),
        };
        assert!(repo.update(&renamed).unwrap());
        assert_eq!(repo.find_by_name("PG-13").unwrap(), Some(renamed));

        assert!(!repo.update(&Rating { id: 404, name: "X".to_string() }).unwrap());

        assert!(repo.delete_by_id(saved.id).unwrap());
        assert!(!repo.delete_by_id(saved.id).unwrap());
        assert!(!repo.delete_all().unwrap());
    }
}
