// src/services/mod.rs
//
// Services Module - thin layer over the repositories that turns misses into
// NotFound, checks names before inserts and reconciles bulk imports.

pub mod film_service;
pub mod genre_service;
pub mod rating_service;
pub mod user_service;

mod reconciliation;

pub use film_service::{FilmService, DEFAULT_POPULAR_COUNT};
pub use genre_service::GenreService;
pub use rating_service::RatingService;
pub use user_service::UserService;
