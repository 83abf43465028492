//! Content-addressed blob repository.
//!
//! Identical content is stored once: rows are keyed by the hash of their
//! bytes and every caller storing the same bytes gets the same row back.

use sqlx::SqliteConnection;
use tracing::{debug, warn};

use super::hashing::Hasher;
use super::types::{BlobKind, ContentBlob};
use crate::{InboxenError, Result};

/// Repository for body and header-data blobs.
pub struct BlobRepository<'c> {
    conn: &'c mut SqliteConnection,
    hasher: Hasher,
    kind: BlobKind,
}

impl<'c> BlobRepository<'c> {
    /// Create a repository for the given blob table.
    pub fn new(conn: &'c mut SqliteConnection, hasher: Hasher, kind: BlobKind) -> Self {
        Self { conn, hasher, kind }
    }

    /// Repository for message bodies.
    pub fn bodies(conn: &'c mut SqliteConnection, hasher: Hasher) -> Self {
        Self::new(conn, hasher, BlobKind::Body)
    }

    /// Repository for header values.
    pub fn header_data(conn: &'c mut SqliteConnection, hasher: Hasher) -> Self {
        Self::new(conn, hasher, BlobKind::HeaderData)
    }

    /// Get a blob by ID.
    pub async fn get_by_id(&mut self, id: i64) -> Result<Option<ContentBlob>> {
        let sql = format!(
            "SELECT id, hashed, data FROM {} WHERE id = ?",
            self.kind.table()
        );
        let blob = sqlx::query_as::<_, ContentBlob>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(blob)
    }

    /// Get a blob by hash key.
    pub async fn get_by_hash(&mut self, hashed: &str) -> Result<Option<ContentBlob>> {
        let sql = format!(
            "SELECT id, hashed, data FROM {} WHERE hashed = ?",
            self.kind.table()
        );
        let blob = sqlx::query_as::<_, ContentBlob>(&sql)
            .bind(hashed)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(blob)
    }

    /// Return the blob stored under the hash of `data`, creating it if absent.
    ///
    /// `hashed` skips hashing when the caller already knows the key. When a
    /// row exists its stored bytes are returned and `data` is not written;
    /// the flag is true only for the call that inserted the row.
    ///
    /// The insert runs before any read so that, inside a transaction, the
    /// write lock is taken before a read snapshot exists.
    pub async fn get_or_create(
        &mut self,
        data: &[u8],
        hashed: Option<&str>,
    ) -> Result<(ContentBlob, bool)> {
        let hashed = match hashed {
            Some(hashed) => hashed.to_string(),
            None => self.hasher.hash(data),
        };

        // Existing or concurrently inserted keys turn this into a no-op.
        let sql = format!(
            "INSERT INTO {} (hashed, data) VALUES (?, ?)
             ON CONFLICT(hashed) DO NOTHING
             RETURNING id, hashed, data",
            self.kind.table()
        );
        let inserted = sqlx::query_as::<_, ContentBlob>(&sql)
            .bind(&hashed)
            .bind(data)
            .fetch_optional(&mut *self.conn)
            .await?;

        if let Some(blob) = inserted {
            debug!(table = self.kind.table(), id = blob.id, "stored new blob");
            return Ok((blob, true));
        }

        let existing = self
            .get_by_hash(&hashed)
            .await?
            .ok_or_else(|| InboxenError::NotFound(format!("{} {}", self.kind.table(), hashed)))?;
        self.check_content(&existing, data);
        Ok((existing, false))
    }

    /// Log a hit whose stored bytes differ from the caller's.
    ///
    /// Only possible with a caller-supplied key that doesn't match the data,
    /// or a digest collision. The stored row still wins.
    fn check_content(&self, existing: &ContentBlob, data: &[u8]) {
        if existing.data != data {
            warn!(
                table = self.kind.table(),
                hashed = %existing.hashed,
                "stored content differs from supplied content with the same hash"
            );
        }
    }

    /// Count stored blobs.
    pub async fn count(&mut self) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.kind.table());
        let count: i64 = sqlx::query_scalar(&sql)
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(count)
    }
}
