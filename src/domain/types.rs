//! Domain types for Inboxen.

use std::fmt;

use chrono::{DateTime, Utc};

/// A mail domain inboxes can be created under.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Domain {
    /// Domain ID.
    pub id: i64,
    /// Domain name (unique), e.g. `example.com`.
    pub domain: String,
    /// When the domain was added.
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.domain)
    }
}
