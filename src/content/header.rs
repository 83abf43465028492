//! Header repositories.

use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use tracing::debug;

use super::blob::BlobRepository;
use super::hashing::Hasher;
use super::types::{Header, HeaderName, HeaderValues, NewHeader};
use crate::{InboxenError, Result};

/// Repository for header names.
pub struct HeaderNameRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> HeaderNameRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Get a header name row by name.
    pub async fn get_by_name(&mut self, name: &str) -> Result<Option<HeaderName>> {
        let row = sqlx::query_as::<_, HeaderName>(
            "SELECT id, name FROM header_names WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(row)
    }

    /// Return the row for `name`, creating it if absent.
    ///
    /// Inserts first, then looks up on conflict.
    pub async fn get_or_create(&mut self, name: &str) -> Result<(HeaderName, bool)> {
        let inserted = sqlx::query_as::<_, HeaderName>(
            "INSERT INTO header_names (name) VALUES (?)
             ON CONFLICT(name) DO NOTHING
             RETURNING id, name",
        )
        .bind(name)
        .fetch_optional(&mut *self.conn)
        .await?;

        match inserted {
            Some(row) => Ok((row, true)),
            None => self
                .get_by_name(name)
                .await?
                .map(|row| (row, false))
                .ok_or_else(|| InboxenError::NotFound(format!("header name {name}"))),
        }
    }
}

/// Repository for headers of message parts.
pub struct HeaderRepository<'c> {
    conn: &'c mut SqliteConnection,
    hasher: Hasher,
}

impl<'c> HeaderRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection, hasher: Hasher) -> Self {
        Self { conn, hasher }
    }

    /// Create a header on `part_id`.
    ///
    /// The name and the value are each looked up or created; the returned
    /// flag says whether the value blob was newly stored. Run it inside a
    /// `Database::begin_immediate` transaction to keep the three writes
    /// together.
    pub async fn create(&mut self, part_id: i64, header: &NewHeader) -> Result<(Header, bool)> {
        let (name, _) = HeaderNameRepository::new(&mut *self.conn)
            .get_or_create(&header.name)
            .await?;
        let (data, created) = BlobRepository::header_data(&mut *self.conn, self.hasher)
            .get_or_create(&header.data, header.hashed.as_deref())
            .await?;

        let row = sqlx::query_as::<_, Header>(
            "INSERT INTO headers (part_id, name_id, data_id, ordinal) VALUES (?, ?, ?, ?)
             RETURNING id, part_id, name_id, data_id, ordinal",
        )
        .bind(part_id)
        .bind(name.id)
        .bind(data.id)
        .bind(header.ordinal)
        .fetch_one(&mut *self.conn)
        .await?;

        debug!(part_id, header = %header.name, ordinal = header.ordinal, "created header");
        Ok((row, created))
    }

    /// Headers of one part whose name is in `names`, in ordinal order.
    ///
    /// An empty `names` returns every header of the part.
    pub async fn get_many(&mut self, part_id: i64, names: &[&str]) -> Result<HeaderValues> {
        let grouped = self.get_many_grouped(&[part_id], names).await?;
        Ok(grouped
            .into_iter()
            .next()
            .map(|(_, values)| values)
            .unwrap_or_default())
    }

    /// Like `get_many` over several parts, grouped by part in ID order.
    ///
    /// Parts without matching headers are left out.
    pub async fn get_many_grouped(
        &mut self,
        part_ids: &[i64],
        names: &[&str],
    ) -> Result<Vec<(i64, HeaderValues)>> {
        if part_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT h.part_id, n.name, d.data
             FROM headers h
             JOIN header_names n ON n.id = h.name_id
             JOIN header_data d ON d.id = h.data_id
             WHERE h.part_id IN (",
        );
        let mut separated = query.separated(", ");
        for part_id in part_ids {
            separated.push_bind(*part_id);
        }
        query.push(")");

        if !names.is_empty() {
            query.push(" AND n.name IN (");
            let mut separated = query.separated(", ");
            for name in names {
                separated.push_bind(*name);
            }
            query.push(")");
        }
        query.push(" ORDER BY h.part_id, h.ordinal, h.id");

        let rows: Vec<(i64, String, Vec<u8>)> = query
            .build_query_as()
            .fetch_all(&mut *self.conn)
            .await?;

        let mut grouped: Vec<(i64, HeaderValues)> = Vec::new();
        for (part_id, name, data) in rows {
            if let Some((last, values)) = grouped.last_mut() {
                if *last == part_id {
                    values.push((name, data));
                    continue;
                }
            }
            grouped.push((part_id, vec![(name, data)]));
        }
        Ok(grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PartListRepository;
    use crate::Database;

    async fn setup_part(conn: &mut SqliteConnection) -> i64 {
        let (body, _) = BlobRepository::bodies(&mut *conn, Hasher::default())
            .get_or_create(b"body", None)
            .await
            .unwrap();
        PartListRepository::new(conn)
            .create(body.id, None)
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_header_create_dedups_name_and_data() {
        let db = Database::open_in_memory().await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let part_id = setup_part(&mut conn).await;
        let mut repo = HeaderRepository::new(&mut conn, Hasher::default());

        let (header1, created1) = repo
            .create(part_id, &NewHeader::new("X-Hello", "Hewwo", 0))
            .await
            .unwrap();
        let (header2, created2) = repo
            .create(part_id, &NewHeader::new("X-Hello", "Hewwo", 1))
            .await
            .unwrap();

        assert_ne!(header1.id, header2.id);
        assert_eq!(header1.name_id, header2.name_id);
        assert_eq!(header1.data_id, header2.data_id);
        assert!(created1);
        assert!(!created2);
    }

    #[tokio::test]
    async fn test_header_create_with_precomputed_hash() {
        let db = Database::open_in_memory().await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let part_id = setup_part(&mut conn).await;
        let hasher = Hasher::default();
        let mut repo = HeaderRepository::new(&mut conn, hasher);

        let (first, _) = repo
            .create(part_id, &NewHeader::new("Subject", "Hi", 0))
            .await
            .unwrap();
        let (second, created) = repo
            .create(
                part_id,
                &NewHeader::new("Subject", "Hi", 1).with_hashed(hasher.hash(b"Hi")),
            )
            .await
            .unwrap();

        assert!(!created);
        assert_eq!(first.data_id, second.data_id);
    }

    #[tokio::test]
    async fn test_header_name_get_or_create() {
        let db = Database::open_in_memory().await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let mut repo = HeaderNameRepository::new(&mut conn);

        let (a, created_a) = repo.get_or_create("From").await.unwrap();
        let (b, created_b) = repo.get_or_create("From").await.unwrap();

        assert_eq!(a, b);
        assert!(created_a);
        assert!(!created_b);
    }

    #[tokio::test]
    async fn test_get_many_preserves_ordinal_order() {
        let db = Database::open_in_memory().await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let part_id = setup_part(&mut conn).await;
        let mut repo = HeaderRepository::new(&mut conn, Hasher::default());

        // Inserted out of order on purpose
        repo.create(part_id, &NewHeader::new("Received", "second hop", 2))
            .await
            .unwrap();
        repo.create(part_id, &NewHeader::new("Subject", "Hi", 0))
            .await
            .unwrap();
        repo.create(part_id, &NewHeader::new("Received", "first hop", 1))
            .await
            .unwrap();

        let all = repo.get_many(part_id, &[]).await.unwrap();
        let names: Vec<&str> = all.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["Subject", "Received", "Received"]);

        let received = repo.get_many(part_id, &["Received"]).await.unwrap();
        assert_eq!(
            received,
            vec![
                ("Received".to_string(), b"first hop".to_vec()),
                ("Received".to_string(), b"second hop".to_vec()),
            ]
        );

        assert!(repo.get_many(part_id, &["Cc"]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_many_grouped_by_part() {
        let db = Database::open_in_memory().await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let part_a = setup_part(&mut conn).await;
        let part_b = setup_part(&mut conn).await;
        let mut repo = HeaderRepository::new(&mut conn, Hasher::default());

        repo.create(part_b, &NewHeader::new("Content-Type", "text/html", 0))
            .await
            .unwrap();
        repo.create(part_a, &NewHeader::new("Content-Type", "text/plain", 0))
            .await
            .unwrap();
        repo.create(part_a, &NewHeader::new("Subject", "Hi", 1))
            .await
            .unwrap();

        let grouped = repo
            .get_many_grouped(&[part_a, part_b], &["Content-Type"])
            .await
            .unwrap();

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0, part_a);
        assert_eq!(grouped[0].1, vec![("Content-Type".to_string(), b"text/plain".to_vec())]);
        assert_eq!(grouped[1].0, part_b);
        assert_eq!(grouped[1].1, vec![("Content-Type".to_string(), b"text/html".to_vec())]);
    }
}
