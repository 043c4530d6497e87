//! HTTP/REST API layer for edgechat.
//!
//! Axum-based REST API at `/api/v1/` with envelope responses and
//! permissive CORS.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
