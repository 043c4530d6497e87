//! Completion request/response types for edgechat.
//!
//! These types model the data shapes exchanged with the upstream completion
//! API: the conversation window sent to the model, sampling parameters, the
//! returned text, and the failure categories the provider can surface.

use serde::{Deserialize, Serialize};

use crate::chat::{ChatMessage, MessageRole};

/// Models the completion client is known to work with.
pub const SUPPORTED_MODELS: &[&str] = &[
    "deepseek-chat",
    "deepseek-coder",
    "gpt-3.5-turbo",
    "gpt-4",
    "gpt-4-turbo-preview",
];

/// Whether `model` is one of [`SUPPORTED_MODELS`].
pub fn is_supported_model(model: &str) -> bool {
    SUPPORTED_MODELS.contains(&model)
}

/// One turn of conversation history sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionMessage {
    pub role: MessageRole,
    pub content: String,
}

impl From<&ChatMessage> for CompletionMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

/// Sampling parameters for a completion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub temperature: f64,
    pub max_tokens: u32,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
}

impl SamplingParams {
    /// Parameters tuned per model family.
    ///
    /// DeepSeek models get a larger output budget and nucleus sampling;
    /// everything else uses the OpenAI-style defaults.
    pub fn for_model(model: &str, temperature: f64) -> Self {
        if model.contains("deepseek") {
            Self {
                temperature,
                max_tokens: 2000,
                frequency_penalty: 0.1,
                presence_penalty: 0.1,
                top_p: Some(0.95),
            }
        } else {
            Self {
                temperature,
                max_tokens: 1500,
                frequency_penalty: 0.1,
                presence_penalty: 0.1,
                top_p: None,
            }
        }
    }
}

/// Request to a completion provider.
///
/// `system` is prepended by the provider as a system-role message; it is
/// never part of the stored conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub messages: Vec<CompletionMessage>,
    pub params: SamplingParams,
}

/// Response from a completion provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
}

/// Errors from completion provider operations.
///
/// The category is logged; end users only ever see a generic message.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("rate limited by upstream provider")]
    RateLimited,

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("completion timed out after {0}s")]
    Timeout(u64),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider error (HTTP {status}): {message}")]
    Provider { status: u16, message: String },
}

impl LlmError {
    /// Short category name used in logs.
    pub fn category(&self) -> &'static str {
        match self {
            LlmError::RateLimited => "rate_limited",
            LlmError::AuthenticationFailed => "auth_failure",
            LlmError::InvalidRequest(_) => "malformed_request",
            LlmError::Unavailable(_) | LlmError::Timeout(_) | LlmError::Transport(_) => {
                "upstream_unavailable"
            }
            LlmError::MalformedResponse(_) => "malformed_response",
            LlmError::Provider { .. } => "provider_error",
        }
    }
}
