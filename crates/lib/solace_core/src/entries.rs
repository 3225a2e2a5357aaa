//! Entry persistence.
//!
//! One row per form submission: what the user wrote and the support message
//! returned for it. Rows are append-only.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;

/// Errors raised by the entry store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// A stored submission.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Entry {
    pub id: i64,
    pub addiction_type: String,
    pub description: String,
    pub response: String,
    pub created_at: DateTime<Utc>,
}

/// Append-only store over the `entries` table.
#[derive(Debug, Clone)]
pub struct EntryStore {
    pool: SqlitePool,
}

impl EntryStore {
    /// Wraps an already-migrated pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert a new entry; `id` and `created_at` are assigned by the database.
    pub async fn append(
        &self,
        addiction_type: &str,
        description: &str,
        response: &str,
    ) -> Result<Entry, StoreError> {
        let entry = sqlx::query_as::<_, Entry>(
            r#"
            INSERT INTO entries (addiction_type, description, response)
            VALUES (?1, ?2, ?3)
            RETURNING id, addiction_type, description, response, created_at
            "#,
        )
        .bind(addiction_type)
        .bind(description)
        .bind(response)
        .fetch_one(&self.pool)
        .await?;

        debug!(id = entry.id, created_at = %entry.created_at, "entry appended");
        Ok(entry)
    }

    /// Insert a new entry with an explicit creation time.
    pub async fn append_at(
        &self,
        addiction_type: &str,
        description: &str,
        response: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Entry, StoreError> {
        let entry = sqlx::query_as::<_, Entry>(
            r#"
            INSERT INTO entries (addiction_type, description, response, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, addiction_type, description, response, created_at
            "#,
        )
        .bind(addiction_type)
        .bind(description)
        .bind(response)
        .bind(timestamp_text(created_at))
        .fetch_one(&self.pool)
        .await?;

        debug!(id = entry.id, created_at = %entry.created_at, "entry appended");
        Ok(entry)
    }

    /// Every entry, newest first.
    pub async fn list_all_ordered(&self) -> Result<Vec<Entry>, StoreError> {
        let rows = sqlx::query_as::<_, Entry>(
            r#"
            SELECT id, addiction_type, description, response, created_at
            FROM entries
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

/// Formats a timestamp the same way the column default does, so that text
/// ordering matches time ordering.
fn timestamp_text(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::db::{DbConfig, EphemeralDb, connect_and_migrate};

    async fn memory_store() -> EntryStore {
        let config = DbConfig {
            url: "sqlite::memory:".into(),
            max_connections: 1,
        };
        let pool = connect_and_migrate(&config).await.expect("memory db");
        EntryStore::new(pool)
    }

    #[test]
    fn timestamp_text_matches_column_default_shape() {
        let at = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(timestamp_text(at), "2025-03-04T05:06:07.000Z");
    }

    #[tokio::test]
    async fn append_assigns_id_and_timestamp() {
        let store = memory_store().await;
        let before = Utc::now() - Duration::seconds(1);

        let entry = store
            .append("gambling", "lost my savings", "You are not alone.")
            .await
            .expect("append");

        assert!(entry.id > 0);
        assert_eq!(entry.addiction_type, "gambling");
        assert_eq!(entry.description, "lost my savings");
        assert_eq!(entry.response, "You are not alone.");
        assert!(entry.created_at >= before);
        assert!(entry.created_at <= Utc::now() + Duration::seconds(1));
    }

    #[tokio::test]
    async fn ids_are_unique_and_increasing() {
        let store = memory_store().await;
        let a = store.append("a", "a", "a").await.unwrap();
        let b = store.append("b", "b", "b").await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn empty_strings_are_stored() {
        let store = memory_store().await;
        let entry = store.append("", "", "fallback").await.unwrap();

        let all = store.list_all_ordered().await.unwrap();
        assert_eq!(all, vec![entry]);
        assert_eq!(all[0].addiction_type, "");
        assert_eq!(all[0].description, "");
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = memory_store().await;
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let t2 = t1 + Duration::minutes(5);
        let t3 = t2 + Duration::milliseconds(1);

        // Insert out of order so the result cannot rely on id order.
        store.append_at("second", "d", "r", t2).await.unwrap();
        store.append_at("third", "d", "r", t3).await.unwrap();
        store.append_at("first", "d", "r", t1).await.unwrap();

        let all = store.list_all_ordered().await.unwrap();
        let kinds: Vec<_> = all.iter().map(|e| e.addiction_type.as_str()).collect();
        assert_eq!(kinds, ["third", "second", "first"]);
        assert_eq!(all[0].created_at, t3);
        assert_eq!(all[2].created_at, t1);
    }

    #[tokio::test]
    async fn same_timestamp_falls_back_to_id_order() {
        let store = memory_store().await;
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let first = store.append_at("x", "d", "r", at).await.unwrap();
        let second = store.append_at("y", "d", "r", at).await.unwrap();

        let all = store.list_all_ordered().await.unwrap();
        assert_eq!(all[0].id, second.id);
        assert_eq!(all[1].id, first.id);
    }

    #[tokio::test]
    async fn default_and_explicit_timestamps_interleave() {
        let store = memory_store().await;
        let old = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
        store.append_at("old", "d", "r", old).await.unwrap();
        store.append("new", "d", "r").await.unwrap();

        let all = store.list_all_ordered().await.unwrap();
        assert_eq!(all[0].addiction_type, "new");
        assert_eq!(all[1].addiction_type, "old");
    }

    #[tokio::test]
    async fn concurrent_appends_are_all_persisted() {
        let db = EphemeralDb::new().await.expect("ephemeral db");
        let store = EntryStore::new(db.pool());

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .append(&format!("kind-{i}"), "concurrent", "ok")
                    .await
                    .map(|e| e.id)
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.expect("join").expect("append"));
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 16);
        assert_eq!(store.list_all_ordered().await.unwrap().len(), 16);
    }
}
