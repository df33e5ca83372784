// src/domain/mod.rs
//
// Domain Root
//
// Plain catalog entities. Identifiers are generated by the database; an
// entity that has not been persisted yet carries id 0.

pub mod film;
pub mod genre;
pub mod rating;
pub mod user;

pub use film::{dedup_genres_by_id, Film};
pub use genre::Genre;
pub use rating::Rating;
pub use user::User;

/// Lookup-table entries identified by a unique name (ratings, genres).
pub trait NamedEntry: Clone {
    fn id(&self) -> i64;
    fn name(&self) -> &str;
    fn set_id(&mut self, id: i64);
}

impl NamedEntry for Rating {
    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl NamedEntry for Genre {
    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}
