//! Session persistence over the key-value store.
//!
//! Each session is one JSON document under `session:<id>`, rewritten in full
//! on every change. Writes refresh a seven day TTL, so idle conversations
//! age out on their own.

use tracing::debug;

use edgechat_types::chat::ChatSession;
use edgechat_types::error::RepositoryError;

use crate::storage::kv_store::{KvStore, PutOptions};

/// Session lifetime after the last write, in seconds.
pub const SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Key prefix shared by all session documents.
pub const KEY_PREFIX: &str = "session:";

/// Reads and writes [`ChatSession`] documents.
pub struct SessionStore<S: KvStore> {
    store: S,
}

impl<S: KvStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Load a session. `Ok(None)` means no such session.
    ///
    /// An undecodable document is an error, not a miss.
    pub async fn get_session(&self, session_id: &str) -> Result<Option<ChatSession>, RepositoryError> {
        let key = session_key(session_id);
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| RepositoryError::Corrupt {
                key,
                reason: e.to_string(),
            })
    }

    /// Write a session, replacing any previous version and refreshing its TTL.
    pub async fn put_session(&self, session: &ChatSession) -> Result<(), RepositoryError> {
        let value = serde_json::to_string(session).map_err(|e| RepositoryError::Query(e.to_string()))?;
        self.store
            .put(
                &session_key(&session.id),
                &value,
                PutOptions::with_ttl_secs(SESSION_TTL_SECS),
            )
            .await?;
        debug!(session_id = %session.id, messages = session.messages.len(), "session persisted");
        Ok(())
    }
}

pub fn session_key(session_id: &str) -> String {
    format!("{KEY_PREFIX}{session_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;
    use crate::storage::memory::MemoryKvStore;
    use crate::test_support::fixed_clock;
    use chrono::Duration;
    use edgechat_types::chat::ChatMessage;

    #[tokio::test]
    async fn test_missing_session_is_none() {
        let sessions = SessionStore::new(MemoryKvStore::new());
        assert!(sessions.get_session("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_then_get_roundtrip() {
        let clock = fixed_clock();
        let sessions = SessionStore::new(MemoryKvStore::with_clock(clock.clone()));
        let session = ChatSession::new("s1".into(), "Hello".into(), clock.now())
            .append_message(ChatMessage::user("m1".into(), "Hello".into(), clock.now()));

        sessions.put_session(&session).await.unwrap();
        let loaded = sessions.get_session("s1").await.unwrap().unwrap();
        assert_eq!(loaded, session);
    }

    #[tokio::test]
    async fn test_empty_session_is_not_a_miss() {
        let clock = fixed_clock();
        let sessions = SessionStore::new(MemoryKvStore::with_clock(clock.clone()));
        sessions
            .put_session(&ChatSession::new("s1".into(), "New Chat".into(), clock.now()))
            .await
            .unwrap();
        let loaded = sessions.get_session("s1").await.unwrap().unwrap();
        assert!(loaded.messages.is_empty());
    }

    #[tokio::test]
    async fn test_write_sets_seven_day_ttl() {
        let clock = fixed_clock();
        let store = MemoryKvStore::with_clock(clock.clone());
        let sessions = SessionStore::new(store.clone());
        let session = ChatSession::new("s1".into(), "t".into(), clock.now());
        sessions.put_session(&session).await.unwrap();
        assert_eq!(store.ttl_secs("session:s1"), Some(604_800));

        // A later write refreshes the TTL.
        clock.advance(Duration::days(6));
        sessions.put_session(&session).await.unwrap();
        clock.advance(Duration::days(6));
        assert!(sessions.get_session("s1").await.unwrap().is_some());

        clock.advance(Duration::days(1));
        assert!(sessions.get_session("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_document_is_error() {
        let store = MemoryKvStore::new();
        store
            .put("session:bad", "{not json", PutOptions::default())
            .await
            .unwrap();
        let sessions = SessionStore::new(store);
        let err = sessions.get_session("bad").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Corrupt { .. }));
    }
}
