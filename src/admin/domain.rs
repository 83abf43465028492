//! Domain management for administrators.
//!
//! - Add a domain, together with its `support` inbox
//! - List domains
//! - Remove a domain and every inbox under it

use std::io::Write;

use futures::TryStreamExt;
use tracing::info;

use crate::db::Database;
use crate::domain::{Domain, DomainRepository};
use crate::inbox::{Inbox, InboxOptions, InboxRepository};
use crate::{InboxenError, Result};

/// Local part of the inbox created with every new domain.
pub const SUPPORT_INBOX: &str = "support";

/// Admin service for domain management.
pub struct DomainAdminService<'a> {
    db: &'a Database,
}

impl<'a> DomainAdminService<'a> {
    /// Create a new DomainAdminService.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Add a domain and its support inbox.
    ///
    /// Both rows are written in one transaction: if either insert fails
    /// (the domain already exists, for instance) neither is kept.
    pub async fn add(&self, name: &str) -> Result<(Domain, Inbox)> {
        require_name(name, "You need to give a domain")?;

        let mut tx = self.db.begin_immediate().await?;

        let domain = DomainRepository::new(&mut tx).create(name).await?;
        let support = InboxRepository::new(&mut tx)
            .create_with_local_part(SUPPORT_INBOX, &domain, &InboxOptions::new())
            .await?;

        tx.commit().await?;

        info!(domain = %domain, support = %support, "domain added");
        Ok((domain, support))
    }

    /// Write every domain name to `out`, one per line, in storage order.
    ///
    /// Domains are streamed from the database as they are written. Returns
    /// the number of domains written.
    pub async fn list<W: Write>(&self, out: &mut W) -> Result<u64> {
        let mut conn = self.db.acquire().await?;
        let mut repo = DomainRepository::new(&mut conn);
        let mut domains = repo.list();

        let mut written = 0;
        while let Some(domain) = domains.try_next().await? {
            writeln!(out, "{domain}")?;
            written += 1;
        }
        Ok(written)
    }

    /// Remove every domain named exactly `name`, cascading to its inboxes.
    ///
    /// Returns the number of domains removed. Removing a domain that doesn't
    /// exist is not an error and leaves storage unchanged.
    pub async fn remove(&self, name: &str) -> Result<u64> {
        require_name(name, "You need to give a domain to remove")?;

        let mut tx = self.db.begin_immediate().await?;
        let removed = DomainRepository::new(&mut tx).delete_by_name(name).await?;
        tx.commit().await?;

        if removed == 0 {
            info!(domain = name, "no such domain, nothing removed");
        } else {
            info!(domain = name, removed, "domain removed");
        }
        Ok(removed)
    }
}

fn require_name(name: &str, message: &str) -> Result<()> {
    if name.is_empty() {
        return Err(InboxenError::Usage(message.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbox::DeletedFilter;

    async fn count(db: &Database, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_add_creates_domain_and_support_inbox() {
        let db = Database::open_in_memory().await.unwrap();
        let service = DomainAdminService::new(&db);

        let (domain, support) = service.add("example.com").await.unwrap();

        assert_eq!(domain.domain, "example.com");
        assert_eq!(support.inbox, "support");
        assert_eq!(support.domain_id, domain.id);
        assert_eq!(support.user_id, None);
        assert_eq!(count(&db, "domains").await, 1);
        assert_eq!(count(&db, "inboxes").await, 1);

        let mut conn = db.acquire().await.unwrap();
        let found = InboxRepository::new(&mut conn)
            .from_string("support@example.com", None, DeletedFilter::NotDeleted)
            .await
            .unwrap();
        assert_eq!(found, support);
    }

    #[tokio::test]
    async fn test_add_duplicate_domain_rolls_back() {
        let db = Database::open_in_memory().await.unwrap();
        let service = DomainAdminService::new(&db);

        service.add("example.com").await.unwrap();
        let result = service.add("example.com").await;

        assert!(matches!(result, Err(InboxenError::AlreadyExists(_))));
        assert_eq!(count(&db, "domains").await, 1);
        assert_eq!(count(&db, "inboxes").await, 1);
    }

    #[tokio::test]
    async fn test_add_requires_name() {
        let db = Database::open_in_memory().await.unwrap();
        let service = DomainAdminService::new(&db);

        let result = service.add("").await;
        assert!(matches!(result, Err(InboxenError::Usage(_))));
        assert_eq!(count(&db, "domains").await, 0);
    }

    #[tokio::test]
    async fn test_list_writes_one_domain_per_line() {
        let db = Database::open_in_memory().await.unwrap();
        let service = DomainAdminService::new(&db);

        service.add("example.com").await.unwrap();
        service.add("example.org").await.unwrap();

        let mut out = Vec::new();
        let written = service.list(&mut out).await.unwrap();

        assert_eq!(written, 2);
        assert_eq!(String::from_utf8(out).unwrap(), "example.com\nexample.org\n");
    }

    #[tokio::test]
    async fn test_list_empty() {
        let db = Database::open_in_memory().await.unwrap();
        let service = DomainAdminService::new(&db);

        let mut out = Vec::new();
        assert_eq!(service.list(&mut out).await.unwrap(), 0);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_remove_cascades_to_inboxes() {
        let db = Database::open_in_memory().await.unwrap();
        let service = DomainAdminService::new(&db);

        service.add("example.com").await.unwrap();
        service.add("example.org").await.unwrap();

        assert_eq!(service.remove("example.com").await.unwrap(), 1);
        assert_eq!(count(&db, "domains").await, 1);
        assert_eq!(count(&db, "inboxes").await, 1);
    }

    #[tokio::test]
    async fn test_remove_missing_domain_is_noop() {
        let db = Database::open_in_memory().await.unwrap();
        let service = DomainAdminService::new(&db);

        service.add("example.com").await.unwrap();

        assert_eq!(service.remove("missing.example").await.unwrap(), 0);
        assert_eq!(count(&db, "domains").await, 1);
        assert_eq!(count(&db, "inboxes").await, 1);
    }

    #[tokio::test]
    async fn test_remove_requires_name() {
        let db = Database::open_in_memory().await.unwrap();
        let service = DomainAdminService::new(&db);

        let result = service.remove("").await;
        assert!(matches!(result, Err(InboxenError::Usage(_))));
    }
}
