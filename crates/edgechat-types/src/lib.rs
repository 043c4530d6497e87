//! Shared domain types for edgechat.
//!
//! This crate contains the types used across the workspace: chat sessions
//! and messages, rate limit records, completion requests, the operation
//! contract exposed to clients, configuration, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod rate_limit;
