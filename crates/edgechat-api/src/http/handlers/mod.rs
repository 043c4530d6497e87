//! HTTP request handlers for the REST API.

pub mod chat;
pub mod operations;
pub mod rate_limit;
pub mod session;
