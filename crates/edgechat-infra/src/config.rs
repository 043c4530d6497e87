//! Configuration loader for edgechat.
//!
//! Reads `config.toml` and deserializes it into [`ChatConfig`], then applies
//! environment overrides. Falls back to defaults when the file is missing or
//! malformed.

use std::path::Path;

use edgechat_types::config::{ChatConfig, parse_max_message_length};
use edgechat_types::llm::{SUPPORTED_MODELS, is_supported_model};

/// Load configuration from `path`.
///
/// - If the file does not exist, returns [`ChatConfig::default()`].
/// - If the file exists but cannot be read or parsed, logs a warning and
///   returns the default.
pub async fn load_config(path: &Path) -> ChatConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return ChatConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return ChatConfig::default();
        }
    };

    match toml::from_str::<ChatConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            ChatConfig::default()
        }
    }
}

/// Load `path` and apply overrides from the process environment.
pub async fn load_config_with_env(path: &Path) -> ChatConfig {
    let config = load_config(path).await;
    apply_env_overrides(config, |name| std::env::var(name).ok())
}

/// Apply environment overrides using `lookup` to read variables.
///
/// Recognized: `MAX_MESSAGES_PER_HOUR`, `MAX_MESSAGE_LENGTH`, `AI_API_URL`,
/// `AI_API_KEY`, `AI_MODEL`. An unparsable quota is ignored with a warning;
/// an unparsable or zero message length becomes 2000.
pub fn apply_env_overrides(mut config: ChatConfig, lookup: impl Fn(&str) -> Option<String>) -> ChatConfig {
    if let Some(raw) = lookup("MAX_MESSAGES_PER_HOUR") {
        match raw.trim().parse::<u32>() {
            Ok(max) => config.limits.max_messages_per_hour = max,
            Err(err) => tracing::warn!("Ignoring MAX_MESSAGES_PER_HOUR={raw:?}: {err}"),
        }
    }

    if let Some(raw) = lookup("MAX_MESSAGE_LENGTH") {
        config.limits.max_message_length = parse_max_message_length(&raw);
    }

    if let Some(url) = lookup("AI_API_URL").filter(|v| !v.is_empty()) {
        config.ai.api_url = url;
    }

    if let Some(key) = lookup("AI_API_KEY").filter(|v| !v.is_empty()) {
        config.ai.api_key = Some(key);
    }

    if let Some(model) = lookup("AI_MODEL").filter(|v| !v.is_empty()) {
        config.ai.model = model;
    }

    if !is_supported_model(&config.ai.model) {
        tracing::warn!(
            "Model '{}' is not in the supported list ({}), continuing anyway",
            config.ai.model,
            SUPPORTED_MODELS.join(", ")
        );
    }

    config
}
