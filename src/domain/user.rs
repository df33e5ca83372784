use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Catalog user. Login and email are unique; friendship edges point from
/// this user to the users they befriended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: i64,

    pub login: String,

    pub email: String,

    /// Display name
    #[serde(rename = "name", default)]
    pub display_name: String,

    pub birthday: NaiveDate,
}

impl User {
    pub fn new(
        login: impl Into<String>,
        email: impl Into<String>,
        display_name: impl Into<String>,
        birthday: NaiveDate,
    ) -> Self {
        Self {
            id: 0,
            login: login.into(),
            email: email.into(),
            display_name: display_name.into(),
            birthday,
        }
    }
}
