// src/application/seed.rs
//
// Reference data every catalog starts with. Seeding goes through the
// reconciliation services, so running it on an existing database keeps
// the stored ids and inserts only what is missing.

use log::info;

use crate::domain::{Genre, Rating};
use crate::error::AppResult;

use super::AppState;

/// MPA film ratings.
pub const DEFAULT_RATINGS: [&str; 5] = ["G", "PG", "PG-13", "R", "NC-17"];

pub const DEFAULT_GENRES: [&str; 6] = [
    "Comedy",
    "Drama",
    "Cartoon",
    "Thriller",
    "Documentary",
    "Action",
];

pub fn seed_reference_data(state: &AppState) -> AppResult<()> {
    let ratings = state
        .rating_service
        .save_many(DEFAULT_RATINGS.iter().map(|name| Rating::new(*name)).collect())?;
    let genres = state
        .genre_service
        .save_many(DEFAULT_GENRES.iter().map(|name| Genre::new(*name)).collect())?;

    info!(
        "Reference data ready: {} ratings, {} genres",
        ratings.len(),
        genres.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    #[test]
    fn test_seed_is_idempotent() {
        let (_dir, pool) = create_test_pool();
        let state = AppState::new(pool);

        seed_reference_data(&state).unwrap();
        let first = state.genre_service.find_all().unwrap();

        seed_reference_data(&state).unwrap();
        let second = state.genre_service.find_all().unwrap();

        assert_eq!(first, second);
        assert_eq!(second.len(), DEFAULT_GENRES.len());
        assert_eq!(
            state.rating_service.find_all().unwrap().len(),
            DEFAULT_RATINGS.len()
        );
    }

    #[test]
    fn test_seed_keeps_ids_of_existing_entries() {
        let (_dir, pool) = create_test_pool();
        let state = AppState::new(pool);
        let drama = state.genre_service.save(Genre::new("Drama")).unwrap();

        seed_reference_data(&state).unwrap();

        assert_eq!(state.genre_service.find_by_name("Drama").unwrap().id, drama.id);
    }
}
