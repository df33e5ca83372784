// src/lib.rs
// Filmorate - movie catalog data-access core
//
// Architecture:
// - Domain: plain entities (Film, User, Genre, Rating)
// - Repositories: one SQLite-backed store per entity behind a trait
// - Services: NotFound translation, name reconciliation, likes and friends
// - Application: wiring, reference data seeding, error responses

pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod repositories;
pub mod services;

// ============================================================================
// PUBLIC API - Domain Entities
// ============================================================================

pub use domain::{dedup_genres_by_id, Film, Genre, Rating, User};

// ============================================================================
// PUBLIC API - Errors & Configuration
// ============================================================================

pub use config::DatabaseConfig;
pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Database
// ============================================================================

pub use db::{create_connection_pool, initialize_database, ConnectionPool};

// ============================================================================
// PUBLIC API - Repositories
// ============================================================================

pub use repositories::{
    FilmRepository, GenreRepository, RatingRepository, SqliteFilmRepository,
    SqliteGenreRepository, SqliteRatingRepository, SqliteUserRepository, UserRepository,
};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{FilmService, GenreService, RatingService, UserService, DEFAULT_POPULAR_COUNT};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::{seed_reference_data, AppState, ErrorResponse, ErrorType};
