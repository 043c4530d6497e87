//! CompletionProvider trait definition.

use edgechat_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for completion API backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in edgechat-infra (e.g., `OpenAiCompatibleProvider`).
pub trait CompletionProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai-compatible").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    ///
    /// Non-2xx responses and responses without usable content are errors.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;

    /// Probe the upstream with a minimal request. Never fails; returns
    /// `false` when the probe does not succeed.
    fn health_check(&self) -> impl std::future::Future<Output = bool> + Send;
}
