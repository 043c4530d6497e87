//! Configuration types for edgechat.
//!
//! `ChatConfig` represents the top-level `config.toml` that controls request
//! quotas, message limits, the upstream completion API, and server settings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rate_limit::DEFAULT_MAX_REQUESTS;

/// Fallback when the configured message length is missing or unusable.
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 2000;

/// Top-level configuration.
///
/// Loaded from `~/.edgechat/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Request quota and content limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Requests allowed per client per hour window.
    #[serde(default = "default_max_messages_per_hour")]
    pub max_messages_per_hour: u32,

    /// Maximum trimmed message length in characters.
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,

    /// Regular expressions rejected in message content.
    #[serde(default = "default_denylist")]
    pub denylist: Vec<String>,
}

fn default_max_messages_per_hour() -> u32 {
    DEFAULT_MAX_REQUESTS
}

fn default_max_message_length() -> usize {
    DEFAULT_MAX_MESSAGE_LENGTH
}

fn default_denylist() -> Vec<String> {
    vec![
        r"(?i)\b(hack|attack|malware|virus)\b".to_string(),
        r"(?i)\b(password|private key|secret)\b".to_string(),
    ]
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_messages_per_hour: default_max_messages_per_hour(),
            max_message_length: default_max_message_length(),
            denylist: default_denylist(),
        }
    }
}

/// Upstream completion API settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Full chat-completions endpoint URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bearer token for the completion API. Usually supplied via `AI_API_KEY`.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Upper bound on a single completion call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Number of most recent messages sent as context.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_api_url() -> String {
    "https://api.deepseek.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_history_window() -> usize {
    10
}

fn default_system_prompt() -> String {
    "You are a friendly and helpful AI assistant. Provide accurate, useful \
     information. Keep answers concise while including the necessary details."
        .to_string()
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            history_window: default_history_window(),
            system_prompt: default_system_prompt(),
        }
    }
}

// Manual Debug so the API key never reaches logs.
impl fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .field("history_window", &self.history_window)
            .finish_non_exhaustive()
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Trusted proxy header carrying the client address.
    #[serde(default = "default_client_ip_header")]
    pub client_ip_header: String,
}

fn default_client_ip_header() -> String {
    "cf-connecting-ip".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            client_ip_header: default_client_ip_header(),
        }
    }
}

/// Parse a configured message length.
///
/// Unparsable or zero values fall back to [`DEFAULT_MAX_MESSAGE_LENGTH`].
pub fn parse_max_message_length(raw: &str) -> usize {
    match raw.trim().parse::<usize>() {
        Ok(0) | Err(_) => DEFAULT_MAX_MESSAGE_LENGTH,
        Ok(n) => n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_config_default_values() {
        let config = ChatConfig::default();
        assert_eq!(config.limits.max_messages_per_hour, 60);
        assert_eq!(config.limits.max_message_length, 2000);
        assert_eq!(config.limits.denylist.len(), 2);
        assert_eq!(config.ai.model, "deepseek-chat");
        assert_eq!(config.ai.history_window, 10);
        assert_eq!(config.server.client_ip_header, "cf-connecting-ip");
    }

    #[test]
    fn test_chat_config_deserialize_with_defaults() {
        let config: ChatConfig = toml::from_str("").unwrap();
        assert_eq!(config.limits.max_messages_per_hour, 60);
        assert!(config.ai.api_key.is_none());
    }

    #[test]
    fn test_chat_config_deserialize_with_values() {
        let toml_str = r#"
[limits]
max_messages_per_hour = 5
max_message_length = 10
denylist = []

[ai]
api_url = "http://localhost:9999/v1/chat/completions"
model = "gpt-4"
timeout_secs = 30

[server]
client_ip_header = "x-real-ip"
"#;
        let config: ChatConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.limits.max_messages_per_hour, 5);
        assert_eq!(config.limits.max_message_length, 10);
        assert!(config.limits.denylist.is_empty());
        assert_eq!(config.ai.model, "gpt-4");
        assert_eq!(config.ai.timeout_secs, 30);
        assert!((config.ai.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.server.client_ip_header, "x-real-ip");
    }

    #[test]
    fn test_ai_config_debug_redacts_key() {
        let ai = AiConfig {
            api_key: Some("sk-very-secret".to_string()),
            ..AiConfig::default()
        };
        let debug = format!("{ai:?}");
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_api_key_not_serialized() {
        let ai = AiConfig {
            api_key: Some("sk-very-secret".to_string()),
            ..AiConfig::default()
        };
        let json = serde_json::to_string(&ai).unwrap();
        assert!(!json.contains("sk-very-secret"));
    }

    #[test]
    fn test_parse_max_message_length() {
        assert_eq!(parse_max_message_length("500"), 500);
        assert_eq!(parse_max_message_length(" 42 "), 42);
        assert_eq!(parse_max_message_length("abc"), 2000);
        assert_eq!(parse_max_message_length(""), 2000);
        assert_eq!(parse_max_message_length("0"), 2000);
    }
}
