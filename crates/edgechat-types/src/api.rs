//! Operation contract exposed to clients.
//!
//! Every operation a client can invoke is a variant of [`ChatRequest`],
//! deserialized and shape-checked at the transport boundary before it
//! reaches the resolver. Results are returned as [`ChatResponse`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::{ChatMessage, ChatSession, MessageRole};
use crate::rate_limit::RateLimitStatus;

/// A client operation.
///
/// Wire format: `{"operation": "sendMessage", "content": "...", "sessionId": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ChatRequest {
    SendMessage {
        /// Optional so that a missing field reaches the validator.
        #[serde(default)]
        content: Option<String>,
        #[serde(default)]
        session_id: Option<String>,
    },
    GetChatHistory {
        session_id: String,
    },
    CreateSession {
        #[serde(default)]
        title: Option<String>,
    },
    GetRateLimitStatus,
    Regenerate {
        session_id: String,
        message_id: String,
    },
    Health,
}

/// The assistant reply to a sent message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub content: String,
    pub role: MessageRole,
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
}

impl MessageResponse {
    /// Pair a stored message with the session it belongs to.
    pub fn new(message: ChatMessage, session_id: String) -> Self {
        Self {
            id: message.id,
            content: message.content,
            role: message.role,
            timestamp: message.timestamp,
            session_id,
        }
    }
}

/// Summary returned when a session is created explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl From<&ChatSession> for SessionSummary {
    fn from(session: &ChatSession) -> Self {
        Self {
            id: session.id.clone(),
            title: session.title.clone(),
            created_at: session.created_at,
        }
    }
}

/// Result of a regeneration request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "camelCase")]
pub enum RegenerateOutcome {
    /// The target message was replaced with a fresh completion.
    Regenerated(ChatMessage),
    /// The completion failed; the target now carries the failure placeholder.
    Failed(ChatMessage),
    /// Preconditions did not hold; the session was left untouched.
    Unchanged,
}

/// Result of a [`ChatRequest`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChatResponse {
    Message(MessageResponse),
    History(Option<ChatSession>),
    Session(SessionSummary),
    RateLimit(RateLimitStatus),
    Regenerate(RegenerateOutcome),
    Health(String),
}
