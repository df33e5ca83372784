// src/services/user_service.rs
use std::sync::Arc;

use log::info;

use crate::domain::User;
use crate::error::{AppError, AppResult};
use crate::repositories::UserRepository;

pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }

    /// A blank display name falls back to the login.
    pub fn create(&self, user: User) -> AppResult<User> {
        let saved = self.user_repo.save(&with_display_name(user))?;
        info!("Created user '{}' (id {})", saved.login, saved.id);
        Ok(saved)
    }

    pub fn update(&self, user: User) -> AppResult<User> {
        let user = with_display_name(user);
        if !self.user_repo.update(&user)? {
            return Err(AppError::not_found("User", format!("id = {}", user.id)));
        }
        Ok(user)
    }

    pub fn get(&self, id: i64) -> AppResult<User> {
        self.user_repo
            .find_by_id(id)?
            .ok_or_else(|| AppError::not_found("User", format!("id = {}", id)))
    }

    pub fn list(&self) -> AppResult<Vec<User>> {
        self.user_repo.find_all()
    }

    pub fn delete(&self, id: i64) -> AppResult<()> {
        if !self.user_repo.delete_by_id(id)? {
            return Err(AppError::not_found("User", format!("id = {}", id)));
        }
        Ok(())
    }

    /// `user_id` befriends `friend_id`; the reverse edge is not created.
    /// Returns false when the friendship was already recorded.
    pub fn add_friend(&self, user_id: i64, friend_id: i64) -> AppResult<bool> {
        if user_id == friend_id {
            return Err(AppError::Validation(format!(
                "User {} cannot befriend themselves",
                user_id
            )));
        }
        self.get(user_id)?;
        self.get(friend_id)?;

        self.user_repo.add_friend(user_id, friend_id)
    }

    pub fn remove_friend(&self, user_id: i64, friend_id: i64) -> AppResult<bool> {
        self.get(user_id)?;
        self.get(friend_id)?;

        self.user_repo.remove_friend(user_id, friend_id)
    }

    pub fn friends(&self, user_id: i64) -> AppResult<Vec<User>> {
        self.get(user_id)?;
        self.user_repo.find_friends_by_id(user_id)
    }

    pub fn common_friends(&self, user_id: i64, other_id: i64) -> AppResult<Vec<User>> {
        self.get(user_id)?;
        self.get(other_id)?;
        self.user_repo.get_common_friends(user_id, other_id)
    }
}

fn with_display_name(mut user: User) -> User {
    if user.display_name.trim().is_empty() {
        user.display_name = user.login.clone();
    }
    user
}
