//! Client identity extractor.
//!
//! The client is identified by the value of a trusted proxy header
//! (`cf-connecting-ip` unless configured otherwise). Requests without it
//! share the `"unknown"` identity and therefore one quota.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use crate::state::AppState;

/// Identity used when the proxy header is missing or unreadable.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// The caller's quota identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity(pub String);

impl FromRequestParts<AppState> for ClientIdentity {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Self(client_id_from_headers(
            &parts.headers,
            &state.config.server.client_ip_header,
        )))
    }
}

/// Read the client identity from `header`, falling back to [`UNKNOWN_CLIENT`].
pub fn client_id_from_headers(headers: &HeaderMap, header: &str) -> String {
    headers
        .get(header)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}
