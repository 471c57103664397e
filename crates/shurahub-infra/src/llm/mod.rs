//! LLM provider implementations.
//!
//! Contains the concrete implementation of the [`LlmProvider`] trait defined
//! in `shurahub-core`, and a provider factory ([`create_provider`]) that
//! builds it from [`ProviderSettings`].
//!
//! [`LlmProvider`]: shurahub_core::llm::provider::LlmProvider

pub mod openai_compat;

use secrecy::SecretString;

use shurahub_core::llm::box_provider::BoxLlmProvider;
use shurahub_types::config::ProviderSettings;

use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::{self as oai_config, GROQ_BASE_URL};

/// Create a [`BoxLlmProvider`] from [`ProviderSettings`].
///
/// Groq at its standard endpoint gets the Groq defaults; anything else is
/// treated as a generic OpenAI-compatible endpoint.
pub fn create_provider(settings: &ProviderSettings, api_key: SecretString) -> BoxLlmProvider {
    let base_url = settings.base_url.trim_end_matches('/');
    let provider = if settings.name == "groq" && base_url == GROQ_BASE_URL {
        OpenAiCompatibleProvider::groq(api_key)
    } else {
        OpenAiCompatibleProvider::new(oai_config::custom(&settings.name, base_url, api_key))
    };
    BoxLlmProvider::new(provider)
}
