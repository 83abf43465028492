//! Administration module for Inboxen.
//!
//! Operations an administrator runs from the command line. Each operation is
//! a single step; multi-row writes run in one transaction.

mod domain;

pub use domain::{DomainAdminService, SUPPORT_INBOX};
