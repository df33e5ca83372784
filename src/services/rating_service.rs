// src/services/rating_service.rs
use std::sync::Arc;

use log::info;

use super::reconciliation::reconcile_by_name;
use crate::domain::Rating;
use crate::error::{AppError, AppResult};
use crate::repositories::RatingRepository;

pub struct RatingService {
    rating_repo: Arc<dyn RatingRepository>,
}

impl RatingService {
    pub fn new(rating_repo: Arc<dyn RatingRepository>) -> Self {
        Self { rating_repo }
    }

    /// Fails with `AlreadyExists` when the name is taken.
    pub fn save(&self, rating: Rating) -> AppResult<Rating> {
        if self.rating_repo.find_by_name(&rating.name)?.is_some() {
            return Err(AppError::already_exists("Rating", &rating.name));
        }

        let saved = self.rating_repo.save(&rating)?;
        info!("Created rating '{}' (id {})", saved.name, saved.id);
        Ok(saved)
    }

    /// Bulk import: names already stored keep their id, the rest are inserted.
    pub fn save_many(&self, ratings: Vec<Rating>) -> AppResult<Vec<Rating>> {
        reconcile_by_name(
            ratings,
            |name| self.rating_repo.find_id_by_name(name),
            |fresh| self.rating_repo.save_many(fresh),
        )
    }

    pub fn update(&self, rating: &Rating) -> AppResult<()> {
        if !self.rating_repo.update(rating)? {
            return Err(AppError::not_found("Rating", format!("id = {}", rating.id)));
        }
        Ok(())
    }

    pub fn find_all(&self) -> AppResult<Vec<Rating>> {
        self.rating_repo.find_all()
    }

    pub fn find_by_id(&self, id: i64) -> AppResult<Rating> {
        self.rating_repo
            .find_by_id(id)?
            .ok_or_else(|| AppError::not_found("Rating", format!("id = {}", id)))
    }

    pub fn find_by_name(&self, name: &str) -> AppResult<Rating> {
        self.rating_repo
            .find_by_name(name)?
            .ok_or_else(|| AppError::not_found("Rating", format!("name '{}'", name)))
    }

    pub fn delete_by_id(&self, id: i64) -> AppResult<()> {
        if !self.rating_repo.delete_by_id(id)? {
            return Err(AppError::not_found("Rating", format!("id = {}", id)));
        }
        Ok(())
    }

    pub fn delete_all(&self) -> AppResult<bool> {
        self.rating_repo.delete_all()
    }
}
