//! Content types for Inboxen.

/// Which content table a blob lives in.
///
/// Bodies and header values share one shape and one dedup strategy but are
/// kept in separate tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobKind {
    /// Message part bodies.
    Body,
    /// Header values.
    HeaderData,
}

impl BlobKind {
    /// Table holding this kind of blob.
    pub fn table(&self) -> &'static str {
        match self {
            BlobKind::Body => "bodies",
            BlobKind::HeaderData => "header_data",
        }
    }
}

/// A stored content blob, unique by hash key.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ContentBlob {
    /// Blob ID.
    pub id: i64,
    /// Hash key, `"<algorithm>:<hex digest>"`.
    pub hashed: String,
    /// Raw content.
    pub data: Vec<u8>,
}

/// A header name, unique by name.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct HeaderName {
    pub id: i64,
    pub name: String,
}

/// A message part.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PartList {
    /// Part ID.
    pub id: i64,
    /// Body blob of this part.
    pub body_id: i64,
    /// Enclosing part, if any.
    pub parent_id: Option<i64>,
}

/// A header row of a message part.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Header {
    pub id: i64,
    pub part_id: i64,
    pub name_id: i64,
    pub data_id: i64,
    /// Position among the part's headers.
    pub ordinal: i64,
}

/// Data for creating a header.
#[derive(Debug, Clone)]
pub struct NewHeader {
    /// Header name, e.g. `Subject`.
    pub name: String,
    /// Raw header value.
    pub data: Vec<u8>,
    /// Position among the part's headers.
    pub ordinal: i64,
    /// Precomputed hash key of `data`, if the caller already has one.
    pub hashed: Option<String>,
}

impl NewHeader {
    /// Create a new header.
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>, ordinal: i64) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            ordinal,
            hashed: None,
        }
    }

    /// Supply a precomputed hash key.
    pub fn with_hashed(mut self, hashed: impl Into<String>) -> Self {
        self.hashed = Some(hashed.into());
        self
    }
}

/// Header values of one part, as `(name, value)` pairs in ordinal order.
pub type HeaderValues = Vec<(String, Vec<u8>)>;
