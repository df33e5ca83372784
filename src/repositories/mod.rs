// src/repositories/mod.rs
//
// Repository layer
//
// RULES:
// - Repositories are data mappers over explicit SQL
// - Reads return Option for a missing row, never an error
// - Writes report "no row affected" as `false`; services decide what it means
// - The film repository is the only one composed from other repositories

pub mod film_repository;
pub mod genre_repository;
pub mod rating_repository;
pub mod user_repository;


pub use film_repository::{FilmRepository, SqliteFilmRepository};
pub use genre_repository::{GenreRepository, SqliteGenreRepository};
pub use rating_repository::{RatingRepository, SqliteRatingRepository};
pub use user_repository::{SqliteUserRepository, UserRepository};

#[cfg(test)]
pub use film_repository::MockFilmRepository;
#[cfg(test)]
pub use genre_repository::MockGenreRepository;
#[cfg(test)]
pub use rating_repository::MockRatingRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;

use chrono::NaiveDate;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Dates are stored as ISO `YYYY-MM-DD` text.
pub(crate) fn date_to_sql(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a stored date column; a malformed value is a conversion error,
/// never a silent default.
pub(crate) fn date_from_sql(column: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Invalid date '{}': {}", raw, e),
            )),
        )
    })
}
