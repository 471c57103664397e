//! Configuration types and defaults for OpenAI-compatible providers.
//!
//! Groq is the default backend; any other endpoint speaking the OpenAI chat
//! completions protocol can be used through [`custom`].

use secrecy::SecretString;

use shurahub_types::llm::ProviderCapabilities;

/// Configuration for an OpenAI-compatible LLM provider.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "groq").
    pub provider_name: String,
    /// Base URL for the API (e.g., "https://api.groq.com/openai/v1").
    pub base_url: String,
    pub api_key: SecretString,
    pub capabilities: ProviderCapabilities,
}

/// Base URL of Groq's OpenAI-compatible endpoint.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Groq default configuration.
///
/// Capabilities: streaming; 128K context, 8K output.
pub fn groq_defaults(api_key: SecretString) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "groq".into(),
        base_url: GROQ_BASE_URL.into(),
        api_key,
        capabilities: ProviderCapabilities {
            streaming: true,
            max_context_tokens: 131_072,
            max_output_tokens: 8_192,
        },
    }
}

/// Configuration for an arbitrary OpenAI-compatible endpoint.
///
/// Output is not capped locally; the configured `max_tokens` is sent as-is.
pub fn custom(name: &str, base_url: &str, api_key: SecretString) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: name.into(),
        base_url: base_url.trim_end_matches('/').into(),
        api_key,
        capabilities: ProviderCapabilities {
            streaming: true,
            max_context_tokens: 128_000,
            max_output_tokens: 0,
        },
    }
}
