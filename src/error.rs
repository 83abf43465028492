//! Error types for Inboxen.

use thiserror::Error;

/// Common error type for Inboxen.
#[derive(Error, Debug)]
pub enum InboxenError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant unless the caller
    /// inspected them first (unique violations, for instance).
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation error for caller input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// A row with the same unique key already exists.
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// An inbox was requested without a domain to bind it to.
    #[error("an inbox needs a domain")]
    MissingDomain,

    /// An email address that could not be split into local part and domain.
    #[error("malformed address: {0:?}")]
    MalformedAddress(String),

    /// Every generated local part collided with an existing inbox.
    #[error("no free inbox address found after {attempts} attempts")]
    AddressSpaceExhausted {
        /// Number of insert attempts made.
        attempts: u32,
    },

    /// Command line usage error.
    #[error("{0}")]
    Usage(String),
}

impl From<sqlx::Error> for InboxenError {
    fn from(e: sqlx::Error) -> Self {
        InboxenError::Database(e.to_string())
    }
}

/// Check whether a sqlx error is a unique constraint violation.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

/// Result type alias for Inboxen operations.
pub type Result<T> = std::result::Result<T, InboxenError>;
