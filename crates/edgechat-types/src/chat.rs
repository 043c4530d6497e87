//! Chat session and message types for edgechat.
//!
//! A session is an ordered, append-only conversation between one client and
//! the assistant. Sessions are serialized as JSON into the key-value store
//! and returned verbatim to clients, so field names follow the camelCase
//! wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Number of characters of the first message kept in a derived title.
pub const TITLE_PREFIX_CHARS: usize = 50;

/// Title used when a session is created without one.
pub const DEFAULT_SESSION_TITLE: &str = "New Chat";

/// Role of a stored chat message.
///
/// Only user and assistant turns are persisted. The system prompt is
/// injected at completion time and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single message within a chat session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub role: MessageRole,
    pub timestamp: DateTime<Utc>,
    /// Set on an assistant message whose regeneration failed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
}

impl ChatMessage {
    /// Build a user message.
    pub fn user(id: String, content: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            content,
            role: MessageRole::User,
            timestamp,
            error: false,
        }
    }

    /// Build an assistant message.
    pub fn assistant(id: String, content: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            content,
            role: MessageRole::Assistant,
            timestamp,
            error: false,
        }
    }
}

/// A persisted conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// Create an empty session.
    pub fn new(id: String, title: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message and advance `updated_at` to its timestamp.
    ///
    /// Pure transformation; persisting the result is the caller's job.
    pub fn append_message(mut self, message: ChatMessage) -> Self {
        self.updated_at = message.timestamp;
        self.messages.push(message);
        self
    }

    /// Replace the message at `index` in place, keeping its position.
    ///
    /// Returns `false` (and leaves the session untouched) if `index` is out
    /// of bounds.
    pub fn replace_message(&mut self, index: usize, message: ChatMessage) -> bool {
        let Some(slot) = self.messages.get_mut(index) else {
            return false;
        };
        self.updated_at = message.timestamp;
        *slot = message;
        true
    }

    /// Position of the message with the given id.
    pub fn position_of(&self, message_id: &str) -> Option<usize> {
        self.messages.iter().position(|m| m.id == message_id)
    }

    /// The most recent `n` messages, oldest first.
    pub fn recent_messages(&self, n: usize) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }
}

/// Derive a session title from the first message of a conversation.
///
/// Keeps the first 50 characters and appends `...` when the content is
/// longer.
pub fn derive_title(content: &str) -> String {
    let mut chars = content.chars();
    let prefix: String = chars.by_ref().take(TITLE_PREFIX_CHARS).collect();
    if chars.next().is_some() {
        format!("{prefix}...")
    } else {
        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_message_role_roundtrip() {
        for role in [MessageRole::User, MessageRole::Assistant] {
            let parsed: MessageRole = role.to_string().parse().unwrap();
            assert_eq!(role, parsed);
        }
        assert!("system".parse::<MessageRole>().is_err());
    }

    #[test]
    fn test_message_role_serde() {
        let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }

    #[test]
    fn test_derive_title_short_content_unchanged() {
        assert_eq!(derive_title("Hello"), "Hello");
    }

    #[test]
    fn test_derive_title_exactly_fifty_chars() {
        let content = "a".repeat(50);
        assert_eq!(derive_title(&content), content);
    }

    #[test]
    fn test_derive_title_truncates_with_ellipsis() {
        let content = "b".repeat(51);
        let title = derive_title(&content);
        assert_eq!(title, format!("{}...", "b".repeat(50)));
    }

    #[test]
    fn test_derive_title_counts_characters_not_bytes() {
        let content = "你好".repeat(30);
        let title = derive_title(&content);
        assert_eq!(title.chars().count(), 53);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn test_append_message_advances_updated_at() {
        let session = ChatSession::new("s1".into(), "t".into(), at(100));
        let session = session.append_message(ChatMessage::user("m1".into(), "hi".into(), at(200)));
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.created_at, at(100));
        assert_eq!(session.updated_at, at(200));
    }

    #[test]
    fn test_replace_message_keeps_position() {
        let mut session = ChatSession::new("s1".into(), "t".into(), at(0))
            .append_message(ChatMessage::user("u1".into(), "q".into(), at(1)))
            .append_message(ChatMessage::assistant("a1".into(), "old".into(), at(2)));

        let replaced = session.replace_message(1, ChatMessage::assistant("a2".into(), "new".into(), at(3)));
        assert!(replaced);
        assert_eq!(session.messages[1].id, "a2");
        assert_eq!(session.messages[1].content, "new");
        assert_eq!(session.updated_at, at(3));
        assert!(!session.replace_message(5, ChatMessage::user("x".into(), "x".into(), at(4))));
    }

    #[test]
    fn test_recent_messages_keeps_oldest_first() {
        let mut session = ChatSession::new("s".into(), "t".into(), at(0));
        for i in 0..15 {
            session = session.append_message(ChatMessage::user(format!("m{i}"), format!("c{i}"), at(i)));
        }
        let recent = session.recent_messages(10);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].id, "m5");
        assert_eq!(recent[9].id, "m14");
        assert_eq!(session.recent_messages(100).len(), 15);
    }

    #[test]
    fn test_session_wire_format_is_camel_case() {
        let session = ChatSession::new("s1".into(), "Hello".into(), at(0));
        let json = serde_json::to_value(&session).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_error_flag_omitted_when_false() {
        let msg = ChatMessage::assistant("a".into(), "ok".into(), at(0));
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("error").is_none());

        let parsed: ChatMessage = serde_json::from_value(json).unwrap();
        assert!(!parsed.error);
    }
}
