//! Storage abstractions for edgechat.
//!
//! Defines the key-value store trait consumed by the session store and the
//! rate limiter, plus an in-process implementation. The SQLite
//! implementation lives in edgechat-infra.

pub mod kv_store;
pub mod memory;
