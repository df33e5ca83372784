use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::genre::Genre;
use super::rating::Rating;

/// A film in the catalog.
///
/// `popularity` is derived: it always equals the number of fans recorded for
/// the film and is only ever written by the like/unlike operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Film {
    #[serde(default)]
    pub id: i64,

    pub name: String,

    #[serde(default)]
    pub description: String,

    pub release_date: NaiveDate,

    /// Duration in minutes
    pub duration: i32,

    /// Age rating; must reference a stored rating
    #[serde(rename = "mpa")]
    pub rating: Rating,

    #[serde(default)]
    pub popularity: i64,

    #[serde(default)]
    pub genres: Vec<Genre>,
}

impl Film {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        release_date: NaiveDate,
        duration: i32,
        rating: Rating,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: description.into(),
            release_date,
            duration,
            rating,
            popularity: 0,
            genres: Vec::new(),
        }
    }

    pub fn with_genres(mut self, genres: Vec<Genre>) -> Self {
        self.genres = genres;
        self
    }
}

/// Drop genres whose id was already seen, keeping first occurrences in order.
pub fn dedup_genres_by_id(genres: &[Genre]) -> Vec<Genre> {
    let mut seen = HashSet::new();
    genres
        .iter()
        .filter(|g| seen.insert(g.id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first_occurrence_order() {
        let genres = vec![
            Genre::with_id(2),
            Genre::with_id(1),
            Genre::with_id(2),
            Genre::with_id(1),
            Genre::with_id(3),
        ];

        let ids: Vec<i64> = dedup_genres_by_id(&genres).iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_json_shape() {
        let film = Film::new(
            "Alien",
            "In space no one can hear you scream",
            NaiveDate::from_ymd_opt(1979, 5, 25).unwrap(),
            117,
            Rating::with_id(4),
        );

        let json = serde_json::to_value(&film).unwrap();
        assert_eq!(json["releaseDate"], "1979-05-25");
        assert_eq!(json["mpa"]["id"], 4);
        assert_eq!(json["popularity"], 0);
    }

    #[test]
    fn test_deserialize_rating_and_genres_by_id() {
        let film: Film = serde_json::from_str(
            r#"{"name":"Heat","releaseDate":"1995-12-15","duration":170,
                "mpa":{"id":4},"genres":[{"id":2},{"id":2}]}"#,
        )
        .unwrap();

        assert_eq!(film.id, 0);
        assert_eq!(film.rating, Rating::with_id(4));
        assert_eq!(film.genres.len(), 2);
        assert!(film.description.is_empty());
    }
}
