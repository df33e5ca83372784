use serde::{Deserialize, Serialize};

/// MPA-style age rating label (G, PG, PG-13, R, NC-17).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rating {
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub name: String,
}

impl Rating {
    /// A rating that is not stored yet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
        }
    }

    /// Reference to a stored rating by id only (name unknown)
    pub fn with_id(id: i64) -> Self {
        Self {
            id,
            name: String::new(),
        }
    }
}
