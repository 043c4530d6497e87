//! Chat orchestration.
//!
//! `ChatResolver` runs the client-facing operations: validating content,
//! enforcing the hourly quota, loading and persisting sessions, and calling
//! the completion provider.

pub mod resolver;
