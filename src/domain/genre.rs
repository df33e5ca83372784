use serde::{Deserialize, Serialize};

/// Genre label. Films link to genres through the `film_genre` join table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genre {
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub name: String,
}

impl Genre {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
        }
    }

    pub fn with_id(id: i64) -> Self {
        Self {
            id,
            name: String::new(),
        }
    }
}
