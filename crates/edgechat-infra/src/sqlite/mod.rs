//! SQLite storage layer.
//!
//! A TTL-aware key-value store backed by SQLite with WAL mode and split
//! read/write connection pools.

pub mod kv;
pub mod pool;
