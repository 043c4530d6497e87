//! Shared test doubles for edgechat-core.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{TimeZone, Utc};

use edgechat_types::error::RepositoryError;
use edgechat_types::llm::{CompletionRequest, CompletionResponse, LlmError};

use crate::clock::ManualClock;
use crate::llm::provider::CompletionProvider;
use crate::storage::kv_store::{KvStore, PutOptions};
use crate::storage::memory::MemoryKvStore;

/// A manual clock parked at 2026-10-18 10:15:00 UTC.
pub fn fixed_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 10, 18, 10, 15, 0).unwrap(),
    ))
}

// --- Failing store ---

/// A store whose reads and/or writes fail with a connection error.
///
/// Operations that are not configured to fail go to an inner memory store.
#[derive(Clone)]
pub struct FailingKvStore {
    inner: MemoryKvStore,
    fail_reads: bool,
    fail_writes: bool,
}

impl FailingKvStore {
    pub fn all() -> Self {
        Self {
            inner: MemoryKvStore::new(),
            fail_reads: true,
            fail_writes: true,
        }
    }

    pub fn writes_only() -> Self {
        Self {
            inner: MemoryKvStore::new(),
            fail_reads: false,
            fail_writes: true,
        }
    }
}

impl KvStore for FailingKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        if self.fail_reads {
            return Err(RepositoryError::Connection);
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: &str, options: PutOptions) -> Result<(), RepositoryError> {
        if self.fail_writes {
            return Err(RepositoryError::Connection);
        }
        self.inner.put(key, value, options).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, RepositoryError> {
        if self.fail_reads {
            return Err(RepositoryError::Connection);
        }
        self.inner.list(prefix).await
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        if self.fail_writes {
            return Err(RepositoryError::Connection);
        }
        self.inner.delete(key).await
    }
}

// --- Slow store ---

/// A memory store whose writes take `delay` to land.
#[derive(Clone)]
pub struct DelayedWritesKvStore {
    inner: MemoryKvStore,
    delay: Duration,
}

impl DelayedWritesKvStore {
    pub fn new(inner: MemoryKvStore, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

impl KvStore for DelayedWritesKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: &str, options: PutOptions) -> Result<(), RepositoryError> {
        tokio::time::sleep(self.delay).await;
        self.inner.put(key, value, options).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, RepositoryError> {
        self.inner.list(prefix).await
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        self.inner.delete(key).await
    }
}

// --- Scripted provider ---

#[derive(Default)]
struct ScriptState {
    replies: VecDeque<Result<String, LlmError>>,
    requests: Vec<CompletionRequest>,
    unhealthy: bool,
    delay: Option<Duration>,
}

/// A provider that replays queued results and records every request.
///
/// With nothing queued it answers `Reply to: <last message content>`.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push_ok(&self, content: &str) {
        self.state().replies.push_back(Ok(content.to_string()));
    }

    pub fn push_err(&self, error: LlmError) {
        self.state().replies.push_back(Err(error));
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.state().unhealthy = !healthy;
    }

    /// Delay every completion by `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        self.state().delay = Some(delay);
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.state().requests.clone()
    }
}

impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let (reply, delay) = {
            let mut state = self.state();
            state.requests.push(request.clone());
            let reply = state.replies.pop_front().unwrap_or_else(|| {
                let last = request
                    .messages
                    .last()
                    .map(|m| m.content.clone())
                    .unwrap_or_default();
                Ok(format!("Reply to: {last}"))
            });
            (reply, state.delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        reply.map(|content| CompletionResponse {
            content,
            model: request.model.clone(),
        })
    }

    async fn health_check(&self) -> bool {
        !self.state().unhealthy
    }
}
