//! Message part repository.

use sqlx::SqliteConnection;

use super::types::PartList;
use crate::{InboxenError, Result};

/// Repository for message parts.
pub struct PartListRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> PartListRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Create a part with the given body, optionally nested under `parent_id`.
    pub async fn create(&mut self, body_id: i64, parent_id: Option<i64>) -> Result<PartList> {
        let part = sqlx::query_as::<_, PartList>(
            "INSERT INTO part_lists (body_id, parent_id) VALUES (?, ?)
             RETURNING id, body_id, parent_id",
        )
        .bind(body_id)
        .bind(parent_id)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(part)
    }

    /// Get a part by ID.
    pub async fn get_by_id(&mut self, id: i64) -> Result<Option<PartList>> {
        let part = sqlx::query_as::<_, PartList>(
            "SELECT id, body_id, parent_id FROM part_lists WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(part)
    }

    /// Direct children of a part, in ID order.
    pub async fn children(&mut self, parent_id: i64) -> Result<Vec<PartList>> {
        let parts = sqlx::query_as::<_, PartList>(
            "SELECT id, body_id, parent_id FROM part_lists WHERE parent_id = ? ORDER BY id",
        )
        .bind(parent_id)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(parts)
    }

    /// Get a part by ID, failing with `NotFound` if absent.
    pub async fn get(&mut self, id: i64) -> Result<PartList> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| InboxenError::NotFound("part".to_string()))
    }
}
