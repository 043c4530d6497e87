//! Chat resolver orchestrating validation, quota, sessions and completion.
//!
//! Each operation is a straight sequence of store and provider calls with no
//! in-process shared state. Two clients writing the same session at once is
//! last-write-wins at the store.

use std::sync::Arc;
use std::time::Duration;

use tracing::{Instrument, debug, info, info_span, warn};

use edgechat_types::api::{ChatRequest, ChatResponse, MessageResponse, RegenerateOutcome, SessionSummary};
use edgechat_types::chat::{
    ChatMessage, ChatSession, DEFAULT_SESSION_TITLE, MessageRole, derive_title,
};
use edgechat_types::config::{AiConfig, ChatConfig};
use edgechat_types::error::ChatError;
use edgechat_types::llm::{CompletionMessage, CompletionRequest, LlmError, SamplingParams};
use edgechat_types::rate_limit::RateLimitStatus;

use crate::clock::{Clock, generate_id};
use crate::llm::provider::CompletionProvider;
use crate::rate_limit::{QuotaWrite, RateLimiter};
use crate::session::SessionStore;
use crate::storage::kv_store::KvStore;
use crate::validation::{MessageValidator, ValidatorConfigError};

/// Content stored in place of an assistant answer whose regeneration failed.
pub const REGENERATION_FAILED_MESSAGE: &str = "Regeneration failed, please try again later.";

/// Completion settings applied to every call.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub model: String,
    pub temperature: f64,
    pub system_prompt: String,
    /// Number of most recent messages sent as context.
    pub history_window: usize,
    pub completion_timeout: Duration,
}

impl ResolverSettings {
    pub fn from_ai_config(ai: &AiConfig) -> Self {
        Self {
            model: ai.model.clone(),
            temperature: ai.temperature,
            system_prompt: ai.system_prompt.clone(),
            history_window: ai.history_window.max(1),
            completion_timeout: Duration::from_secs(ai.timeout_secs),
        }
    }
}

/// Runs the chat operations.
///
/// Generic over the session store backend `S`, the rate limit store backend
/// `R` and the completion provider `P`, so edgechat-core never depends on
/// edgechat-infra.
pub struct ChatResolver<S: KvStore, R: KvStore, P: CompletionProvider> {
    validator: MessageValidator,
    rate_limiter: Arc<RateLimiter<R>>,
    sessions: SessionStore<S>,
    provider: P,
    settings: ResolverSettings,
    clock: Arc<dyn Clock>,
}

impl<S: KvStore, R: KvStore + 'static, P: CompletionProvider> ChatResolver<S, R, P> {
    pub fn new(
        validator: MessageValidator,
        rate_limiter: RateLimiter<R>,
        sessions: SessionStore<S>,
        provider: P,
        settings: ResolverSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            validator,
            rate_limiter: Arc::new(rate_limiter),
            sessions,
            provider,
            settings,
            clock,
        }
    }

    /// Wire a resolver from configuration.
    ///
    /// Fails only if a denylist pattern does not compile.
    pub fn from_config(
        config: &ChatConfig,
        session_store: S,
        rate_store: R,
        provider: P,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ValidatorConfigError> {
        let validator = MessageValidator::from_limits(&config.limits)?;
        let rate_limiter = RateLimiter::new(
            rate_store,
            config.limits.max_messages_per_hour,
            clock.clone(),
        );

        Ok(Self::new(
            validator,
            rate_limiter,
            SessionStore::new(session_store),
            provider,
            ResolverSettings::from_ai_config(&config.ai),
            clock,
        ))
    }

    pub fn rate_limiter(&self) -> &RateLimiter<R> {
        &self.rate_limiter
    }

    pub fn sessions(&self) -> &SessionStore<S> {
        &self.sessions
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    // --- Operations ---

    /// Send a user message and return the assistant reply.
    ///
    /// Quota is consumed once validation passes, even if the completion
    /// later fails. An unknown `session_id` creates a session under that id.
    /// Nothing is persisted unless the completion succeeds.
    pub async fn send_message(
        &self,
        content: Option<&str>,
        session_id: Option<String>,
        client_id: &str,
    ) -> Result<MessageResponse, ChatError> {
        self.validator.validate(content)?;
        let content = content.unwrap_or_default();

        self.enforce_quota(client_id).await?;

        let session_id = session_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(generate_id);
        let now = self.clock.now();

        let session = match self.sessions.get_session(&session_id).await? {
            Some(session) => session,
            None => {
                info!(session_id = %session_id, "starting new session");
                ChatSession::new(session_id.clone(), derive_title(content), now)
            }
        };

        let session =
            session.append_message(ChatMessage::user(generate_id(), content.to_string(), now));

        let reply = self
            .complete(session.recent_messages(self.settings.history_window))
            .await?;

        let assistant = ChatMessage::assistant(generate_id(), reply, self.clock.now());
        let session = session.append_message(assistant.clone());
        self.sessions.put_session(&session).await?;

        Ok(MessageResponse::new(assistant, session_id))
    }

    /// Replace an assistant answer with a fresh completion.
    ///
    /// The target must be an assistant message directly preceded by a user
    /// message; otherwise the session is left untouched and no quota is
    /// consumed. A failed completion overwrites the target with a placeholder
    /// flagged as an error.
    pub async fn regenerate(
        &self,
        session_id: &str,
        message_id: &str,
        client_id: &str,
    ) -> Result<RegenerateOutcome, ChatError> {
        let Some(mut session) = self.sessions.get_session(session_id).await? else {
            return Err(ChatError::SessionNotFound);
        };

        let Some(index) = regenerable_index(&session, message_id) else {
            debug!(session_id, message_id, "nothing to regenerate");
            return Ok(RegenerateOutcome::Unchanged);
        };

        self.enforce_quota(client_id).await?;

        let start = index.saturating_sub(self.settings.history_window);
        let result = self.complete(&session.messages[start..index]).await;
        let now = self.clock.now();

        let (message, failed) = match result {
            Ok(reply) => (ChatMessage::assistant(generate_id(), reply, now), false),
            Err(_) => {
                let mut placeholder = ChatMessage::assistant(
                    message_id.to_string(),
                    REGENERATION_FAILED_MESSAGE.to_string(),
                    now,
                );
                placeholder.error = true;
                (placeholder, true)
            }
        };

        session.replace_message(index, message.clone());
        self.sessions.put_session(&session).await?;

        Ok(if failed {
            RegenerateOutcome::Failed(message)
        } else {
            RegenerateOutcome::Regenerated(message)
        })
    }

    /// Load a session. `None` when it does not exist or has expired.
    pub async fn get_chat_history(&self, session_id: &str) -> Result<Option<ChatSession>, ChatError> {
        Ok(self.sessions.get_session(session_id).await?)
    }

    /// Create an empty session, titled `"New Chat"` unless a title is given.
    pub async fn create_session(&self, title: Option<&str>) -> Result<SessionSummary, ChatError> {
        let title = match title.filter(|t| !t.is_empty()) {
            Some(title) => {
                self.validator.validate_title(title)?;
                title.to_string()
            }
            None => DEFAULT_SESSION_TITLE.to_string(),
        };

        let session = ChatSession::new(generate_id(), title, self.clock.now());
        self.sessions.put_session(&session).await?;
        info!(session_id = %session.id, "session created");
        Ok(SessionSummary::from(&session))
    }

    pub async fn rate_limit_status(&self, client_id: &str) -> RateLimitStatus {
        self.rate_limiter.check_limit(client_id).await
    }

    pub fn health(&self) -> &'static str {
        "OK"
    }

    /// Dispatch a tagged request to the matching operation.
    pub async fn handle(&self, request: ChatRequest, client_id: &str) -> Result<ChatResponse, ChatError> {
        match request {
            ChatRequest::SendMessage {
                content,
                session_id,
            } => self
                .send_message(content.as_deref(), session_id, client_id)
                .await
                .map(ChatResponse::Message),
            ChatRequest::GetChatHistory { session_id } => self
                .get_chat_history(&session_id)
                .await
                .map(ChatResponse::History),
            ChatRequest::CreateSession { title } => self
                .create_session(title.as_deref())
                .await
                .map(ChatResponse::Session),
            ChatRequest::GetRateLimitStatus => {
                Ok(ChatResponse::RateLimit(self.rate_limit_status(client_id).await))
            }
            ChatRequest::Regenerate {
                session_id,
                message_id,
            } => self
                .regenerate(&session_id, &message_id, client_id)
                .await
                .map(ChatResponse::Regenerate),
            ChatRequest::Health => Ok(ChatResponse::Health(self.health().to_string())),
        }
    }

    // --- Internals ---

    async fn enforce_quota(&self, client_id: &str) -> Result<(), ChatError> {
        let status = self.rate_limiter.check_limit(client_id).await;
        if status.remaining == 0 {
            info!(client_id, "rate limit exceeded");
            return Err(ChatError::RateLimitExceeded {
                reset_time_ms: status.reset_time,
            });
        }

        // Runs as its own task so a dropped request cannot cancel the write.
        let limiter = Arc::clone(&self.rate_limiter);
        let client = client_id.to_string();
        let write = tokio::spawn(async move { limiter.record_request(&client).await });

        match write.await {
            Ok(QuotaWrite::Recorded { .. }) => {}
            Ok(QuotaWrite::BestEffortFailed { reason }) => {
                warn!(client_id, reason = %reason, "failed to record request, continuing uncounted");
            }
            Err(e) => {
                warn!(client_id, error = %e, "quota write task failed, continuing uncounted");
            }
        }
        Ok(())
    }

    async fn complete(&self, history: &[ChatMessage]) -> Result<String, LlmError> {
        let request = CompletionRequest {
            model: self.settings.model.clone(),
            system: self.settings.system_prompt.clone(),
            messages: history.iter().map(CompletionMessage::from).collect(),
            params: SamplingParams::for_model(&self.settings.model, self.settings.temperature),
        };

        let span = info_span!(
            "gen_ai.chat",
            otel.name = %format!("chat {}", request.model),
            gen_ai.operation.name = "chat",
            gen_ai.provider.name = self.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.params.max_tokens,
            gen_ai.request.temperature = request.params.temperature,
            gen_ai.response.id = tracing::field::Empty,
            gen_ai.response.model = tracing::field::Empty,
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
        );

        debug!(model = %request.model, messages = request.messages.len(), "requesting completion");

        let timeout = self.settings.completion_timeout;
        let result = tokio::time::timeout(timeout, self.provider.complete(&request).instrument(span))
            .await
            .unwrap_or_else(|_| Err(LlmError::Timeout(timeout.as_secs())));

        match result {
            Ok(response) => Ok(response.content),
            Err(e) => {
                warn!(category = e.category(), error = %e, "completion failed");
                Err(e)
            }
        }
    }
}

/// Index of `message_id` if it is an assistant message directly preceded by
/// a user message.
fn regenerable_index(session: &ChatSession, message_id: &str) -> Option<usize> {
    let index = session.position_of(message_id)?;
    let target = &session.messages[index];
    let previous = session.messages.get(index.checked_sub(1)?)?;
    (target.role == MessageRole::Assistant && previous.role == MessageRole::User).then_some(index)
}
