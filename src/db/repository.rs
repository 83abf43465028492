//! User repository for Inboxen.

use chrono::Utc;
use sqlx::SqliteConnection;

use super::user::{NewUser, User};
use crate::error::is_unique_violation;
use crate::{InboxenError, Result};

/// Repository for user rows.
pub struct UserRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> UserRepository<'c> {
    /// Create a new UserRepository on the given connection or transaction.
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Create a new user.
    ///
    /// Returns `AlreadyExists` if the username is taken.
    pub async fn create(&mut self, new_user: &NewUser) -> Result<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, created_at) VALUES (?, ?)
             RETURNING id, username, created_at",
        )
        .bind(&new_user.username)
        .bind(Utc::now())
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                InboxenError::AlreadyExists(format!("user {}", new_user.username))
            } else {
                e.into()
            }
        })
    }

    /// Get a user by ID.
    pub async fn get_by_id(&mut self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(user)
    }

    /// Get a user by username.
    pub async fn get_by_username(&mut self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(user)
    }

    /// Delete a user by ID. Owned inboxes are kept and lose their owner.
    ///
    /// Returns true if a user was deleted, false if not found.
    pub async fn delete(&mut self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
