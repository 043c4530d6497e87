//! Completion provider implementations.
//!
//! [`create_provider`] builds the configured provider behind a
//! [`BoxCompletionProvider`].

pub mod openai_compat;

use std::time::Duration;

use secrecy::SecretString;

use edgechat_core::llm::box_provider::BoxCompletionProvider;
use edgechat_types::config::AiConfig;
use edgechat_types::llm::LlmError;

use self::openai_compat::OpenAiCompatibleProvider;

/// Create a [`BoxCompletionProvider`] from the `[ai]` configuration.
///
/// A missing API key is allowed; the upstream will reject calls with an
/// authentication error.
pub fn create_provider(ai: &AiConfig) -> Result<BoxCompletionProvider, LlmError> {
    let api_key = ai.api_key.clone().map(SecretString::from);
    if api_key.is_none() {
        tracing::warn!("no AI API key configured, completions will fail authentication");
    }

    let provider = OpenAiCompatibleProvider::new(ai.api_url.clone(), api_key, ai.model.clone())?
        .with_probe_timeout(Duration::from_secs(ai.timeout_secs));
    Ok(BoxCompletionProvider::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgechat_core::llm::provider::CompletionProvider;

    #[test]
    fn test_create_provider_without_key() {
        let provider = create_provider(&AiConfig::default()).unwrap();
        assert_eq!(provider.name(), "openai-compatible");
    }
}
