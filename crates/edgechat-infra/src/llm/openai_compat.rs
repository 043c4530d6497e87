//! OpenAiCompatibleProvider -- [`CompletionProvider`] for any API speaking
//! the OpenAI chat-completions wire format (DeepSeek, OpenAI and friends).
//!
//! The configured URL is the full chat-completions endpoint. The API key is
//! wrapped in [`secrecy::SecretString`] and is only exposed when building
//! the `Authorization` header.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::Span;

use edgechat_core::llm::provider::CompletionProvider;
use edgechat_observe::genai_attrs::{
    GEN_AI_RESPONSE_ID, GEN_AI_RESPONSE_MODEL, GEN_AI_USAGE_INPUT_TOKENS,
    GEN_AI_USAGE_OUTPUT_TOKENS,
};
use edgechat_types::chat::MessageRole;
use edgechat_types::llm::{
    CompletionMessage, CompletionRequest, CompletionResponse, LlmError, SamplingParams,
};

/// Output budget for the health probe.
const HEALTH_PROBE_MAX_TOKENS: u32 = 5;

/// Upper bound on the health probe unless configured otherwise.
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(60);

// --- Wire types ---

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
    frequency_penalty: f64,
    presence_penalty: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    id: Option<String>,
    model: Option<String>,
    #[serde(default)]
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: Option<WireChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct WireChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
}

/// Provider for OpenAI-compatible chat-completions endpoints.
///
/// Does NOT derive Debug; the client holds the API key.
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<SecretString>,
    model: String,
    probe_timeout: Duration,
}

impl OpenAiCompatibleProvider {
    /// Create a provider posting to `api_url`.
    ///
    /// The HTTP client has no request timeout of its own; the chat resolver
    /// bounds every completion and [`Self::with_probe_timeout`] bounds the
    /// health probe.
    pub fn new(
        api_url: String,
        api_key: Option<SecretString>,
        model: String,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| LlmError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url,
            api_key,
            model,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        })
    }

    /// Bound the health probe; an expired probe reports unhealthy.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// The default model for this provider.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request<'a>(&'a self, request: &'a CompletionRequest) -> WireRequest<'a> {
        let model = if request.model.is_empty() {
            self.model.as_str()
        } else {
            request.model.as_str()
        };

        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !request.system.is_empty() {
            messages.push(WireMessage {
                role: "system",
                content: &request.system,
            });
        }
        messages.extend(request.messages.iter().map(|m| WireMessage {
            role: match m.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
            },
            content: &m.content,
        }));

        WireRequest {
            model,
            messages,
            temperature: request.params.temperature,
            max_tokens: request.params.max_tokens,
            frequency_penalty: request.params.frequency_penalty,
            presence_penalty: request.params.presence_penalty,
            top_p: request.params.top_p,
            stream: false,
        }
    }

    async fn send(&self, body: &WireRequest<'_>) -> Result<WireResponse, LlmError> {
        let mut builder = self.client.post(&self.api_url).json(body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Unavailable(format!("request timed out: {e}"))
            } else {
                LlmError::Transport(e.without_url().to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(map_status(status.as_u16(), error_body));
        }

        response
            .json::<WireResponse>()
            .await
            .map_err(|e| LlmError::MalformedResponse(format!("failed to parse response: {e}")))
    }
}

/// Map a non-2xx upstream status to an error category.
fn map_status(status: u16, body: String) -> LlmError {
    match status {
        400 => LlmError::InvalidRequest(body),
        401 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited,
        s if s >= 500 => LlmError::Unavailable(format!("HTTP {s}")),
        s => LlmError::Provider {
            status: s,
            message: body,
        },
    }
}

fn record_response(response: &WireResponse) {
    let span = Span::current();
    if let Some(id) = &response.id {
        span.record(GEN_AI_RESPONSE_ID, id.as_str());
    }
    if let Some(model) = &response.model {
        span.record(GEN_AI_RESPONSE_MODEL, model.as_str());
    }
    if let Some(usage) = &response.usage {
        if let Some(input) = usage.prompt_tokens {
            span.record(GEN_AI_USAGE_INPUT_TOKENS, input);
        }
        if let Some(output) = usage.completion_tokens {
            span.record(GEN_AI_USAGE_OUTPUT_TOKENS, output);
        }
    }
}

impl CompletionProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.build_request(request);
        let wire = self.send(&body).await?;
        record_response(&wire);

        let content = wire
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| LlmError::MalformedResponse("response has no content".to_string()))?;

        Ok(CompletionResponse {
            content,
            model: wire.model.unwrap_or_else(|| body.model.to_string()),
        })
    }

    async fn health_check(&self) -> bool {
        let mut params = SamplingParams::for_model(&self.model, 0.0);
        params.max_tokens = HEALTH_PROBE_MAX_TOKENS;
        let probe = CompletionRequest {
            model: self.model.clone(),
            system: String::new(),
            messages: vec![CompletionMessage {
                role: MessageRole::User,
                content: "Hello".to_string(),
            }],
            params,
        };

        let result = tokio::time::timeout(self.probe_timeout, self.complete(&probe))
            .await
            .unwrap_or_else(|_| Err(LlmError::Timeout(self.probe_timeout.as_secs())));

        match result {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(category = e.category(), error = %e, "health probe failed");
                false
            }
        }
    }
}
