// src/services/genre_service.rs
use std::sync::Arc;

use log::info;

use super::reconciliation::reconcile_by_name;
use crate::domain::Genre;
use crate::error::{AppError, AppResult};
use crate::repositories::GenreRepository;

pub struct GenreService {
    genre_repo: Arc<dyn GenreRepository>,
}

impl GenreService {
    pub fn new(genre_repo: Arc<dyn GenreRepository>) -> Self {
        Self { genre_repo }
    }

    pub fn save(&self, genre: Genre) -> AppResult<Genre> {
        if self.genre_repo.find_by_name(&genre.name)?.is_some() {
            return Err(AppError::already_exists("Genre", &genre.name));
        }

        let saved = self.genre_repo.save(&genre)?;
        info!("Created genre '{}' (id {})", saved.name, saved.id);
        Ok(saved)
    }

    /// Bulk import: names already stored keep their id, the rest are inserted.
    pub fn save_many(&self, genres: Vec<Genre>) -> AppResult<Vec<Genre>> {
        reconcile_by_name(
            genres,
            |name| self.genre_repo.find_id_by_name(name),
            |fresh| self.genre_repo.save_many(fresh),
        )
    }

    pub fn update(&self, genre: &Genre) -> AppResult<()> {
        if !self.genre_repo.update(genre)? {
            return Err(AppError::not_found("Genre", format!("id = {}", genre.id)));
        }
        Ok(())
    }

    pub fn find_all(&self) -> AppResult<Vec<Genre>> {
        self.genre_repo.find_all()
    }

    pub fn find_by_id(&self, id: i64) -> AppResult<Genre> {
        self.genre_repo
            .find_by_id(id)?
            .ok_or_else(|| AppError::not_found("Genre", format!("id = {}", id)))
    }

    pub fn find_by_name(&self, name: &str) -> AppResult<Genre> {
        self.genre_repo
            .find_by_name(name)?
            .ok_or_else(|| AppError::not_found("Genre", format!("name '{}'", name)))
    }

    pub fn delete_by_id(&self, id: i64) -> AppResult<()> {
        if !self.genre_repo.delete_by_id(id)? {
            return Err(AppError::not_found("Genre", format!("id = {}", id)));
        }
        Ok(())
    }

    pub fn delete_all(&self) -> AppResult<bool> {
        self.genre_repo.delete_all()
    }
}
