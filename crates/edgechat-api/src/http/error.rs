//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uuid::Uuid;

use edgechat_types::error::ChatError;

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Errors from the chat resolver.
    Chat(ChatError),
    /// The request body could not be decoded.
    BadRequest(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::BadRequest(e.body_text())
    }
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Chat(ChatError::Validation(_)) | AppError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            AppError::Chat(ChatError::RateLimitExceeded { .. }) => {
                (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED")
            }
            AppError::Chat(ChatError::Upstream(_)) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            AppError::Chat(ChatError::SessionNotFound) => {
                (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND")
            }
            AppError::Chat(ChatError::Store(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }

    fn user_message(&self) -> String {
        match self {
            AppError::Chat(e) => e.user_message(),
            AppError::BadRequest(msg) => format!("Invalid request: {msg}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let (message, details) = match &self {
            AppError::Chat(ChatError::RateLimitExceeded { reset_time_ms }) => (
                self.user_message(),
                Some(json!({ "resetTime": reset_time_ms })),
            ),
            _ => (self.user_message(), None),
        };

        if status.is_server_error() {
            tracing::error!(code, error = ?self, "request failed");
        }

        let body = ApiResponse::error(code, &message, details, Uuid::now_v7().to_string());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgechat_types::error::{RepositoryError, ValidationError};
    use edgechat_types::llm::LlmError;

    fn status_of(err: ChatError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(ValidationError::Empty.into()), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(ChatError::RateLimitExceeded { reset_time_ms: 0 }),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(status_of(LlmError::RateLimited.into()), StatusCode::BAD_GATEWAY);
        assert_eq!(status_of(ChatError::SessionNotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(RepositoryError::Connection.into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_bad_request_status() {
        let resp = AppError::BadRequest("expected value".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
