//! Content-addressed message storage for Inboxen.
//!
//! Message bodies and header values are stored once per distinct content,
//! keyed by a configurable digest of their bytes. Header names are
//! deduplicated by name. Nothing is reference counted: a blob no header or
//! part points at any more stays until removed by other means.

mod blob;
mod hashing;
mod header;
mod part;
mod types;

pub use blob::BlobRepository;
pub use hashing::{HashAlgorithm, Hasher};
pub use header::{HeaderNameRepository, HeaderRepository};
pub use part::PartListRepository;
pub use types::{BlobKind, ContentBlob, Header, HeaderName, HeaderValues, NewHeader, PartList};
