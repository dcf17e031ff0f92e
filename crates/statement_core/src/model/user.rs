//! User identity model.

use serde::{Deserialize, Serialize};

/// Database identity of a `Users` row.
pub type UserId = i64;

/// Identity claims handed over by the sign-in provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleProfile {
    pub email: String,
    pub display_name: Option<String>,
    pub picture_url: Option<String>,
}

impl GoogleProfile {
    pub fn new(
        email: impl Into<String>,
        display_name: Option<String>,
        picture_url: Option<String>,
    ) -> Self {
        Self {
            email: email.into(),
            display_name,
            picture_url,
        }
    }
}

/// Persisted `Users` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    /// Unique sign-in email; the upsert key.
    pub google_email: String,
    pub display_name: Option<String>,
    pub picture_url: Option<String>,
}
