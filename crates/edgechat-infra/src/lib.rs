//! Infrastructure layer for edgechat.
//!
//! Contains implementations of the ports defined in `edgechat-core`: the
//! SQLite key-value store and the OpenAI-compatible completion client, plus
//! configuration loading and data-directory resolution.

pub mod config;
pub mod filesystem;
pub mod llm;
pub mod sqlite;
