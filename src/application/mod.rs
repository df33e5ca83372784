// src/application/mod.rs
//
// Application Layer
//
// - Wires repositories into services (AppState)
// - Seeds reference data (MPA ratings, genres)
// - Maps AppError into caller-facing error responses

pub mod error_handling;
pub mod seed;
pub mod state;

pub use error_handling::{ErrorResponse, ErrorType, ToErrorResponse};
pub use seed::{seed_reference_data, DEFAULT_GENRES, DEFAULT_RATINGS};
pub use state::AppState;
