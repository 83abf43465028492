//! Inboxes for Inboxen.
//!
//! An inbox is a local part under a domain, optionally owned by a user.
//! Random local parts are drawn from the 26 lowercase letters.

mod address;
mod repository;
mod types;

pub use address::parse_address;
pub use repository::{random_local_part, InboxRepository, DEFAULT_LENGTH, DEFAULT_MAX_ATTEMPTS};
pub use types::{DeletedFilter, Inbox, InboxFlags, InboxOptions};
