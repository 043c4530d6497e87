use thiserror::Error;

use crate::llm::LlmError;

/// Errors from key-value store operations (used by trait definitions in edgechat-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("store connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("corrupt record at '{key}': {reason}")]
    Corrupt { key: String, reason: String },
}

/// Message and title validation failures.
///
/// The display text is shown to end users as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Message content is required and must be a string")]
    Missing,

    #[error("Message content cannot be empty")]
    Empty,

    #[error("Message content cannot exceed {max} characters")]
    TooLong { max: usize },

    #[error("Message content contains inappropriate terms")]
    Forbidden,

    #[error("Session title cannot exceed {max} characters")]
    TitleTooLong { max: usize },
}

/// Errors from chat operations.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("rate limit exceeded (resets at {reset_time_ms})")]
    RateLimitExceeded { reset_time_ms: i64 },

    #[error("completion failed: {0}")]
    Upstream(#[from] LlmError),

    #[error("store error: {0}")]
    Store(#[from] RepositoryError),

    #[error("session not found")]
    SessionNotFound,
}

impl ChatError {
    /// Message safe to show to an end user.
    ///
    /// Upstream and store failures collapse to generic text; their details
    /// belong in logs only.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Validation(e) => e.to_string(),
            ChatError::RateLimitExceeded { .. } => {
                "Rate limit exceeded. Please try again later.".to_string()
            }
            ChatError::Upstream(_) => {
                "The assistant is temporarily unavailable. Please try again later.".to_string()
            }
            ChatError::Store(_) => {
                "Failed to process the request. Please try again later.".to_string()
            }
            ChatError::SessionNotFound => "Session not found".to_string(),
        }
    }
}
