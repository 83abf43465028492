//! Inbox repository for Inboxen.
//!
//! Random inbox creation relies on the `UNIQUE(inbox, domain_id)` constraint
//! to detect taken addresses: each attempt inserts inside a savepoint and a
//! unique violation rolls that savepoint back and draws again.

use chrono::Utc;
use rand::Rng;
use sqlx::{Connection, QueryBuilder, Sqlite, SqliteConnection};
use tracing::{debug, warn};

use super::address::parse_address;
use super::types::{DeletedFilter, Inbox, InboxFlags, InboxOptions, InboxRow};
use crate::config::InboxConfig;
use crate::domain::Domain;
use crate::error::is_unique_violation;
use crate::{InboxenError, Result};

/// Default number of insert attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

/// Default length of generated local parts.
pub const DEFAULT_LENGTH: usize = 6;

/// Characters generated local parts are drawn from.
const LOCAL_PART_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

const SELECT_INBOX: &str = "SELECT i.id, i.inbox, i.domain_id, d.domain, i.user_id,
        i.created_at, i.flags, i.description
 FROM inboxes i
 JOIN domains d ON d.id = i.domain_id";

/// Generate a random local part of `length` lowercase letters.
///
/// Every character is an independent draw, so repeats are possible.
pub fn random_local_part(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..LOCAL_PART_CHARS.len());
            LOCAL_PART_CHARS[idx] as char
        })
        .collect()
}

/// Repository for inbox rows.
pub struct InboxRepository<'c> {
    conn: &'c mut SqliteConnection,
    length: usize,
    max_attempts: u32,
}

impl<'c> InboxRepository<'c> {
    /// Create a new InboxRepository on the given connection or transaction.
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self {
            conn,
            length: DEFAULT_LENGTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Create a repository using the `[inbox]` settings for generation.
    pub fn with_config(conn: &'c mut SqliteConnection, config: &InboxConfig) -> Self {
        Self {
            conn,
            length: config.length,
            max_attempts: config.max_attempts,
        }
    }

    /// Set how many insert attempts `create` makes before giving up.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Create an inbox with a random local part of the configured length.
    pub async fn create_default(
        &mut self,
        domain: Option<&Domain>,
        options: &InboxOptions,
    ) -> Result<Inbox> {
        self.create(self.length, domain, options).await
    }

    /// Create an inbox with a random local part of `length` letters.
    ///
    /// Fails with `MissingDomain` when no domain is given, before anything is
    /// generated or written. Local parts that are already taken under the
    /// domain are redrawn; after `max_attempts` collisions the call fails
    /// with `AddressSpaceExhausted`.
    pub async fn create(
        &mut self,
        length: usize,
        domain: Option<&Domain>,
        options: &InboxOptions,
    ) -> Result<Inbox> {
        let domain = domain.ok_or(InboxenError::MissingDomain)?;
        if length == 0 {
            return Err(InboxenError::Validation(
                "inbox length must be at least 1".to_string(),
            ));
        }

        for attempt in 1..=self.max_attempts {
            let local_part = random_local_part(length);
            if let Some(inbox) = self.try_insert(&local_part, domain, options).await? {
                debug!(inbox = %inbox, attempt, "created inbox");
                return Ok(inbox);
            }
            debug!(local_part = %local_part, domain = %domain, attempt, "local part taken, retrying");
        }

        warn!(
            domain = %domain,
            length,
            attempts = self.max_attempts,
            "gave up generating an inbox address"
        );
        Err(InboxenError::AddressSpaceExhausted {
            attempts: self.max_attempts,
        })
    }

    /// Create an inbox with a fixed local part.
    ///
    /// Returns `AlreadyExists` if the address is taken.
    pub async fn create_with_local_part(
        &mut self,
        local_part: &str,
        domain: &Domain,
        options: &InboxOptions,
    ) -> Result<Inbox> {
        self.try_insert(local_part, domain, options)
            .await?
            .ok_or_else(|| InboxenError::AlreadyExists(format!("inbox {local_part}@{domain}")))
    }

    /// Insert one inbox inside a savepoint.
    ///
    /// Returns `None` if the local part is taken under the domain; any other
    /// failure is an error.
    async fn try_insert(
        &mut self,
        local_part: &str,
        domain: &Domain,
        options: &InboxOptions,
    ) -> Result<Option<Inbox>> {
        let mut savepoint = self.conn.begin().await?;

        let inserted: std::result::Result<i64, sqlx::Error> = sqlx::query_scalar(
            "INSERT INTO inboxes (inbox, domain_id, user_id, created_at, flags, description)
             VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(local_part)
        .bind(domain.id)
        .bind(options.user_id)
        .bind(Utc::now())
        .bind(options.flags.bits())
        .bind(&options.description)
        .fetch_one(&mut *savepoint)
        .await;

        match inserted {
            Ok(id) => {
                savepoint.commit().await?;
                let inbox = self
                    .get_by_id(id)
                    .await?
                    .ok_or_else(|| InboxenError::NotFound("inbox".to_string()))?;
                Ok(Some(inbox))
            }
            Err(e) if is_unique_violation(&e) => {
                savepoint.rollback().await?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get an inbox by ID.
    pub async fn get_by_id(&mut self, id: i64) -> Result<Option<Inbox>> {
        let sql = format!("{SELECT_INBOX} WHERE i.id = ?");
        let row = sqlx::query_as::<_, InboxRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(row.map(InboxRow::into_inbox))
    }

    /// Resolve a full email address to its inbox.
    ///
    /// `user_id` restricts the match to inboxes owned by that user. Fails
    /// with `MalformedAddress` if `email` has no `@` and `NotFound` if
    /// nothing matches.
    pub async fn from_string(
        &mut self,
        email: &str,
        user_id: Option<i64>,
        deleted: DeletedFilter,
    ) -> Result<Inbox> {
        let (local_part, domain) = parse_address(email)?;

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_INBOX);
        query.push(" WHERE i.inbox = ");
        query.push_bind(local_part);
        query.push(" AND d.domain = ");
        query.push_bind(domain);
        push_deleted_filter(&mut query, deleted);
        if let Some(user_id) = user_id {
            query.push(" AND i.user_id = ");
            query.push_bind(user_id);
        }
        // (inbox, domain) is unique, so at most one row can match
        query.push(" ORDER BY i.id LIMIT 1");

        let row: Option<InboxRow> = query
            .build_query_as()
            .fetch_optional(&mut *self.conn)
            .await?;

        row.map(InboxRow::into_inbox)
            .ok_or_else(|| InboxenError::NotFound("inbox".to_string()))
    }

    /// List a user's inboxes, newest first.
    pub async fn list_for_user(
        &mut self,
        user_id: i64,
        deleted: DeletedFilter,
    ) -> Result<Vec<Inbox>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_INBOX);
        query.push(" WHERE i.user_id = ");
        query.push_bind(user_id);
        push_deleted_filter(&mut query, deleted);
        query.push(" ORDER BY i.created_at DESC, i.id DESC");

        let rows: Vec<InboxRow> = query
            .build_query_as()
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(rows.into_iter().map(InboxRow::into_inbox).collect())
    }

    /// List every inbox under a domain, in ID order.
    pub async fn list_for_domain(&mut self, domain_id: i64) -> Result<Vec<Inbox>> {
        let sql = format!("{SELECT_INBOX} WHERE i.domain_id = ? ORDER BY i.id");
        let rows = sqlx::query_as::<_, InboxRow>(&sql)
            .bind(domain_id)
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(rows.into_iter().map(InboxRow::into_inbox).collect())
    }

    /// Replace an inbox's flags.
    ///
    /// Returns true if the inbox exists.
    pub async fn set_flags(&mut self, id: i64, flags: InboxFlags) -> Result<bool> {
        let result = sqlx::query("UPDATE inboxes SET flags = ? WHERE id = ?")
            .bind(flags.bits())
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete an inbox row.
    ///
    /// Returns true if an inbox was deleted, false if not found.
    pub async fn delete(&mut self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM inboxes WHERE id = ?")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count inboxes under a domain.
    pub async fn count_for_domain(&mut self, domain_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inboxes WHERE domain_id = ?")
            .bind(domain_id)
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(count)
    }
}

fn push_deleted_filter(query: &mut QueryBuilder<'_, Sqlite>, deleted: DeletedFilter) {
    let bit = InboxFlags::DELETED.bits();
    match deleted {
        DeletedFilter::Deleted => {
            query.push(format!(" AND (i.flags & {bit}) != 0"));
        }
        DeletedFilter::NotDeleted => {
            query.push(format!(" AND (i.flags & {bit}) = 0"));
        }
        DeletedFilter::Any => {}
    }
}
