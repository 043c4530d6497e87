//! OpenTelemetry GenAI Semantic Convention attribute names.
//!
//! Completion calls run in a span named `"chat {model}"` that declares these
//! fields up front; providers fill the response-side ones with
//! `Span::record` once the upstream answers.

/// The unique response ID returned by the provider.
pub const GEN_AI_RESPONSE_ID: &str = "gen_ai.response.id";

/// The model that actually served the request.
pub const GEN_AI_RESPONSE_MODEL: &str = "gen_ai.response.model";

/// The number of input tokens consumed.
pub const GEN_AI_USAGE_INPUT_TOKENS: &str = "gen_ai.usage.input_tokens";

/// The number of output tokens generated.
pub const GEN_AI_USAGE_OUTPUT_TOKENS: &str = "gen_ai.usage.output_tokens";
