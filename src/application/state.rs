// src/application/state.rs

use std::sync::Arc;

use crate::db::ConnectionPool;
use crate::repositories::{
    FilmRepository, GenreRepository, RatingRepository, SqliteFilmRepository,
    SqliteGenreRepository, SqliteRatingRepository, SqliteUserRepository, UserRepository,
};
use crate::services::{FilmService, GenreService, RatingService, UserService};

/// Shared application state.
/// All fields are Arc-wrapped so the state can be cloned into request handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<ConnectionPool>,
    pub film_service: Arc<FilmService>,
    pub user_service: Arc<UserService>,
    pub genre_service: Arc<GenreService>,
    pub rating_service: Arc<RatingService>,
}

impl AppState {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        // REPOSITORIES
        let rating_repo: Arc<dyn RatingRepository> =
            Arc::new(SqliteRatingRepository::new(pool.clone()));
        let genre_repo: Arc<dyn GenreRepository> =
            Arc::new(SqliteGenreRepository::new(pool.clone()));
        let user_repo: Arc<dyn UserRepository> = Arc::new(SqliteUserRepository::new(pool.clone()));
        let film_repo: Arc<dyn FilmRepository> = Arc::new(SqliteFilmRepository::new(
            pool.clone(),
            rating_repo.clone(),
            genre_repo.clone(),
        ));

        // SERVICES
        let film_service = Arc::new(FilmService::new(
            film_repo,
            user_repo.clone(),
            rating_repo.clone(),
            genre_repo.clone(),
        ));
        let user_service = Arc::new(UserService::new(user_repo));
        let genre_service = Arc::new(GenreService::new(genre_repo));
        let rating_service = Arc::new(RatingService::new(rating_repo));

        Self {
            pool,
            film_service,
            user_service,
            genre_service,
            rating_service,
        }
    }
}
