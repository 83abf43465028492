//! Domain repository for Inboxen.

use chrono::Utc;
use futures::stream::{BoxStream, StreamExt};
use sqlx::SqliteConnection;

use super::types::Domain;
use crate::error::is_unique_violation;
use crate::{InboxenError, Result};

/// Repository for domain rows.
pub struct DomainRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> DomainRepository<'c> {
    /// Create a new DomainRepository on the given connection or transaction.
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Create a new domain.
    ///
    /// Returns `AlreadyExists` if a domain with the same name exists.
    pub async fn create(&mut self, name: &str) -> Result<Domain> {
        sqlx::query_as::<_, Domain>(
            "INSERT INTO domains (domain, created_at) VALUES (?, ?)
             RETURNING id, domain, created_at",
        )
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                InboxenError::AlreadyExists(format!("domain {name}"))
            } else {
                e.into()
            }
        })
    }

    /// Get a domain by ID.
    pub async fn get_by_id(&mut self, id: i64) -> Result<Option<Domain>> {
        let domain = sqlx::query_as::<_, Domain>(
            "SELECT id, domain, created_at FROM domains WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(domain)
    }

    /// Get a domain by name.
    pub async fn get_by_name(&mut self, name: &str) -> Result<Option<Domain>> {
        let domain = sqlx::query_as::<_, Domain>(
            "SELECT id, domain, created_at FROM domains WHERE domain = ?",
        )
        .bind(name)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(domain)
    }

    /// Stream all domains in storage order.
    ///
    /// Rows are decoded as the stream is polled; the full set is never held
    /// in memory.
    pub fn list(&mut self) -> BoxStream<'_, Result<Domain>> {
        sqlx::query_as::<_, Domain>("SELECT id, domain, created_at FROM domains ORDER BY id")
            .fetch(&mut *self.conn)
            .map(|row| row.map_err(InboxenError::from))
            .boxed()
    }

    /// Delete every domain named exactly `name`, cascading to its inboxes.
    ///
    /// Returns the number of domains deleted.
    pub async fn delete_by_name(&mut self, name: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM domains WHERE domain = ?")
            .bind(name)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Count all domains.
    pub async fn count(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM domains")
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use futures::TryStreamExt;

    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn test_create_and_get_domain() {
        let db = Database::open_in_memory().await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let mut repo = DomainRepository::new(&mut conn);

        let domain = repo.create("example.com").await.unwrap();
        assert_eq!(domain.domain, "example.com");
        assert_eq!(domain.to_string(), "example.com");

        assert_eq!(repo.get_by_id(domain.id).await.unwrap(), Some(domain.clone()));
        assert_eq!(repo.get_by_name("example.com").await.unwrap(), Some(domain));
        assert!(repo.get_by_name("example.org").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_domain() {
        let db = Database::open_in_memory().await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let mut repo = DomainRepository::new(&mut conn);

        repo.create("example.com").await.unwrap();
        let result = repo.create("example.com").await;

        assert!(matches!(result, Err(InboxenError::AlreadyExists(_))));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_in_storage_order() {
        let db = Database::open_in_memory().await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let mut repo = DomainRepository::new(&mut conn);

        for name in ["b.example", "a.example", "c.example"] {
            repo.create(name).await.unwrap();
        }

        let names: Vec<String> = repo
            .list()
            .map_ok(|d| d.domain)
            .try_collect()
            .await
            .unwrap();
        assert_eq!(names, ["b.example", "a.example", "c.example"]);
    }

    #[tokio::test]
    async fn test_delete_by_name() {
        let db = Database::open_in_memory().await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let mut repo = DomainRepository::new(&mut conn);

        repo.create("example.com").await.unwrap();

        assert_eq!(repo.delete_by_name("missing.example").await.unwrap(), 0);
        assert_eq!(repo.delete_by_name("example.com").await.unwrap(), 1);
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
