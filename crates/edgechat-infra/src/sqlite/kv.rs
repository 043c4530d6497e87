//! SQLite key-value store implementation.
//!
//! Implements `KvStore` from `edgechat-core` using sqlx with split read/write
//! pools. Every store handle is bound to a namespace, so sessions and rate
//! limit records share one table without sharing keys. Expiry is stored as
//! Unix milliseconds; expired rows are filtered on read and removed by
//! [`SqliteKvStore::purge_expired`].

use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::Row;
use tracing::debug;

use edgechat_core::clock::{Clock, SystemClock};
use edgechat_core::storage::kv_store::{KvStore, PutOptions};
use edgechat_types::error::RepositoryError;

use super::pool::DatabasePool;

/// Namespace holding chat session documents.
pub const SESSIONS_NAMESPACE: &str = "sessions";

/// Namespace holding rate limit records.
pub const RATE_LIMITS_NAMESPACE: &str = "rate_limits";

/// SQLite-backed implementation of `KvStore`.
#[derive(Clone)]
pub struct SqliteKvStore {
    pool: DatabasePool,
    namespace: String,
    clock: Arc<dyn Clock>,
}

impl SqliteKvStore {
    /// Create a store over `pool` scoped to `namespace`.
    pub fn new(pool: DatabasePool, namespace: impl Into<String>) -> Self {
        Self::with_clock(pool, namespace, Arc::new(SystemClock))
    }

    pub fn with_clock(pool: DatabasePool, namespace: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            pool,
            namespace: namespace.into(),
            clock,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Delete every expired row in this namespace. Returns the number removed.
    pub async fn purge_expired(&self) -> Result<u64, RepositoryError> {
        let now = self.now_millis();
        let result = sqlx::query(
            "DELETE FROM kv_entries WHERE namespace = ? AND expires_at IS NOT NULL AND expires_at <= ?",
        )
        .bind(&self.namespace)
        .bind(now)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        let purged = result.rows_affected();
        debug!(namespace = %self.namespace, purged, "purged expired entries");
        Ok(purged)
    }

    fn now_millis(&self) -> i64 {
        self.clock.now().timestamp_millis()
    }
}

fn query_error(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::Connection
        }
        other => RepositoryError::Query(other.to_string()),
    }
}

impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let row = sqlx::query(
            "SELECT value FROM kv_entries
             WHERE namespace = ? AND key = ? AND (expires_at IS NULL OR expires_at > ?)",
        )
        .bind(&self.namespace)
        .bind(key)
        .bind(self.now_millis())
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(query_error)?;

        row.map(|row| row.try_get::<String, _>("value").map_err(query_error))
            .transpose()
    }

    async fn put(&self, key: &str, value: &str, options: PutOptions) -> Result<(), RepositoryError> {
        let now = Utc::now().to_rfc3339();
        let expires_at = options
            .ttl_secs
            .map(|secs| (self.clock.now() + Duration::seconds(secs as i64)).timestamp_millis());

        sqlx::query(
            r#"INSERT INTO kv_entries (namespace, key, value, expires_at, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)
               ON CONFLICT (namespace, key) DO UPDATE SET
                   value = excluded.value,
                   expires_at = excluded.expires_at,
                   updated_at = excluded.updated_at"#,
        )
        .bind(&self.namespace)
        .bind(key)
        .bind(value)
        .bind(expires_at)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT key FROM kv_entries
             WHERE namespace = ? AND substr(key, 1, length(?)) = ?
               AND (expires_at IS NULL OR expires_at > ?)
             ORDER BY key",
        )
        .bind(&self.namespace)
        .bind(prefix)
        .bind(prefix)
        .bind(self.now_millis())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("key").map_err(query_error))
            .collect()
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM kv_entries WHERE namespace = ? AND key = ?")
            .bind(&self.namespace)
            .bind(key)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        Ok(())
    }
}
