//! Domain management for Inboxen.

mod repository;
mod types;

pub use repository::DomainRepository;
pub use types::Domain;
