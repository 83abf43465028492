//! Inboxen - anonymous email inbox storage
//!
//! Domains with generated inbox addresses, plus content-addressed storage of
//! message bodies and headers, on top of SQLite.

pub mod admin;
pub mod cli;
pub mod config;
pub mod content;
pub mod db;
pub mod domain;
pub mod error;
pub mod inbox;
pub mod logging;

pub use admin::{DomainAdminService, SUPPORT_INBOX};
pub use config::Config;
pub use content::{BlobRepository, HashAlgorithm, Hasher, HeaderRepository, PartListRepository};
pub use db::{Database, NewUser, User, UserRepository};
pub use domain::{Domain, DomainRepository};
pub use error::{InboxenError, Result};
pub use inbox::{
    parse_address, DeletedFilter, Inbox, InboxFlags, InboxOptions, InboxRepository,
};
