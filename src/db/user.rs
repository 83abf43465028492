//! User model for Inboxen.
//!
//! Only the fields the storage layer needs to scope inboxes to an owner.
//! Authentication lives elsewhere.

use chrono::{DateTime, Utc};

/// A registered user that may own inboxes.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Login username (unique).
    pub username: String,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login username.
    pub username: String,
}

impl NewUser {
    /// Create a new user.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}
