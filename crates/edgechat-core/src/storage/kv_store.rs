//! Key-value store trait.
//!
//! Defines the interface for string-keyed storage with optional TTL.
//! Implementations live in `storage::memory` and edgechat-infra.

use edgechat_types::error::RepositoryError;

/// Options for a single `put`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PutOptions {
    /// Seconds until the entry expires. `None` keeps it forever.
    pub ttl_secs: Option<u64>,
}

impl PutOptions {
    pub fn with_ttl_secs(ttl_secs: u64) -> Self {
        Self {
            ttl_secs: Some(ttl_secs),
        }
    }
}

/// Trait for string-keyed persistent storage with expiry.
///
/// The contract is last-write-wins with no transactional read-modify-write
/// and no read-after-write guarantee across nodes. Expired entries must be
/// invisible to `get` and `list`.
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait KvStore: Send + Sync {
    /// Get a value by key. Returns None if the key does not exist or has expired.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, RepositoryError>> + Send;

    /// Set a value for a key (upsert), replacing any previous TTL.
    fn put(
        &self,
        key: &str,
        value: &str,
        options: PutOptions,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// List live keys starting with `prefix`, in ascending order.
    fn list(
        &self,
        prefix: &str,
    ) -> impl std::future::Future<Output = Result<Vec<String>, RepositoryError>> + Send;

    /// Delete a key. No-op if key does not exist.
    fn delete(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
