//! In-process key-value store.
//!
//! Backed by a `DashMap` and a [`Clock`], so expiry can be driven by a
//! [`ManualClock`](crate::clock::ManualClock) in tests. Expired entries are
//! dropped lazily when they are read or listed.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use edgechat_types::error::RepositoryError;

use crate::clock::{Clock, SystemClock};
use crate::storage::kv_store::{KvStore, PutOptions};

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl MemoryEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// `DashMap`-backed implementation of `KvStore`.
///
/// Cloning shares the underlying map.
#[derive(Clone)]
pub struct MemoryKvStore {
    entries: Arc<DashMap<String, MemoryEntry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Number of stored entries, including expired ones not yet dropped.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remaining TTL of a live entry, in whole seconds.
    pub fn ttl_secs(&self, key: &str) -> Option<i64> {
        let now = self.clock.now();
        let entry = self.entries.get(key)?;
        entry
            .expires_at
            .filter(|_| entry.is_live(now))
            .map(|at| (at - now).num_seconds())
    }
}

impl Default for MemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let now = self.clock.now();
        // Read under the shard lock, then release it before removing.
        let found = self
            .entries
            .get(key)
            .map(|entry| (entry.is_live(now), entry.value.clone()));

        match found {
            Some((true, value)) => Ok(Some(value)),
            Some((false, _)) => {
                self.entries.remove_if(key, |_, entry| !entry.is_live(now));
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        key: &str,
        value: &str,
        options: PutOptions,
    ) -> Result<(), RepositoryError> {
        let expires_at = options
            .ttl_secs
            .map(|secs| self.clock.now() + Duration::seconds(secs as i64));

        self.entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, RepositoryError> {
        let now = self.clock.now();
        self.entries.retain(|_, entry| entry.is_live(now));

        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 10, 18, 10, 0, 0).unwrap(),
        ))
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let store = MemoryKvStore::new();
        store.put("a", "1", PutOptions::default()).await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), Some("1".to_string()));
    }

    #[tokio::test]
    async fn test_get_nonexistent_returns_none() {
        let store = MemoryKvStore::new();
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_upserts_and_replaces_ttl() {
        let clock = clock();
        let store = MemoryKvStore::with_clock(clock.clone());
        store.put("k", "1", PutOptions::with_ttl_secs(10)).await.unwrap();
        store.put("k", "2", PutOptions::with_ttl_secs(100)).await.unwrap();

        clock.advance(Duration::seconds(50));
        assert_eq!(store.get("k").await.unwrap(), Some("2".to_string()));
        assert_eq!(store.ttl_secs("k"), Some(50));
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let clock = clock();
        let store = MemoryKvStore::with_clock(clock.clone());
        store.put("k", "v", PutOptions::with_ttl_secs(60)).await.unwrap();

        clock.advance(Duration::seconds(59));
        assert!(store.get("k").await.unwrap().is_some());

        clock.advance(Duration::seconds(1));
        assert!(store.get("k").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_list_filters_prefix_and_expired() {
        let clock = clock();
        let store = MemoryKvStore::with_clock(clock.clone());
        store.put("rate_limit:b", "1", PutOptions::default()).await.unwrap();
        store.put("rate_limit:a", "1", PutOptions::default()).await.unwrap();
        store.put("rate_limit:c", "1", PutOptions::with_ttl_secs(5)).await.unwrap();
        store.put("session:x", "1", PutOptions::default()).await.unwrap();

        let keys = store.list("rate_limit:").await.unwrap();
        assert_eq!(keys, vec!["rate_limit:a", "rate_limit:b", "rate_limit:c"]);

        clock.advance(Duration::seconds(5));
        let keys = store.list("rate_limit:").await.unwrap();
        assert_eq!(keys, vec!["rate_limit:a", "rate_limit:b"]);
    }

    #[tokio::test]
    async fn test_delete_nonexistent_is_noop() {
        let store = MemoryKvStore::new();
        store.delete("nope").await.unwrap();
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryKvStore::new();
        let other = store.clone();
        store.put("k", "v", PutOptions::default()).await.unwrap();
        assert_eq!(other.get("k").await.unwrap(), Some("v".to_string()));
    }
}
