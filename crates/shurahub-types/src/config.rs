//! Configuration types for Shurahub.
//!
//! `ShurahubConfig` represents the top-level `config.toml`. Every section and
//! field has a default, so an empty file (or no file) yields a usable setup.

use serde::{Deserialize, Serialize};

/// Top-level configuration, loaded once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShurahubConfig {
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub gateway: GatewaySettings,
    #[serde(default)]
    pub context: ContextSettings,
    #[serde(default)]
    pub debate: DebateSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
}

/// The model pool debates draw from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Ordered, non-empty list of opaque model identifiers.
    #[serde(default = "default_pool")]
    pub pool: Vec<String>,
}

fn default_pool() -> Vec<String> {
    vec![
        "moonshotai/kimi-k2-instruct-0905".to_string(),
        "openai/gpt-oss-safeguard-20b".to_string(),
        "qwen/qwen3-32b".to_string(),
        "llama-3.3-70b-versatile".to_string(),
    ]
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self { pool: default_pool() }
    }
}

/// Connection settings for the OpenAI-compatible provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_provider_name")]
    pub name: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub temperature: Option<f64>,
}

fn default_provider_name() -> String {
    "groq".to_string()
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_max_tokens() -> u32 {
    2048
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            max_tokens: default_max_tokens(),
            temperature: None,
        }
    }
}

/// Behaviour of the model gateway's fallback phase and chunk channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySettings {
    /// Timeout for the single non-streaming fallback request.
    #[serde(default = "default_fallback_timeout_secs")]
    pub fallback_timeout_secs: u64,
    /// Model identifier reported when both phases fail.
    #[serde(default = "default_placeholder_model")]
    pub placeholder_model: String,
    /// Capacity of the bounded channel between the provider worker and the session.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_fallback_timeout_secs() -> u64 {
    30
}

fn default_placeholder_model() -> String {
    "gemma-7b-it".to_string()
}

fn default_channel_capacity() -> usize {
    64
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            fallback_timeout_secs: default_fallback_timeout_secs(),
            placeholder_model: default_placeholder_model(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Bounds for the per-session short-term memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSettings {
    #[serde(default = "default_context_capacity")]
    pub capacity: usize,
    /// Characters kept from each question.
    #[serde(default = "default_question_chars")]
    pub question_chars: usize,
    /// Characters kept from each synthesized answer.
    #[serde(default = "default_answer_chars")]
    pub answer_chars: usize,
}

fn default_context_capacity() -> usize {
    3
}

fn default_question_chars() -> usize {
    200
}

fn default_answer_chars() -> usize {
    400
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            capacity: default_context_capacity(),
            question_chars: default_question_chars(),
            answer_chars: default_answer_chars(),
        }
    }
}

/// Presentation settings for debate frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateSettings {
    /// Sender name used on acknowledgement and error frames.
    #[serde(default = "default_system_sender")]
    pub system_sender: String,
    /// Prefix applied to the synthesizer's final frame (not to the stored text).
    #[serde(default = "default_verdict_prefix")]
    pub verdict_prefix: String,
}

fn default_system_sender() -> String {
    "Shurahub".to_string()
}

fn default_verdict_prefix() -> String {
    "Final Verdict: ".to_string()
}

impl Default for DebateSettings {
    fn default() -> Self {
        Self {
            system_sender: default_system_sender(),
            verdict_prefix: default_verdict_prefix(),
        }
    }
}

/// Identity resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Environment variable holding the HS256 session-token secret.
    /// When unset, every connection is treated as a guest.
    #[serde(default = "default_jwt_secret_env")]
    pub jwt_secret_env: String,
    #[serde(default = "default_audience")]
    pub audience: String,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Query parameter carrying the visitor identifier.
    #[serde(default = "default_visitor_param")]
    pub visitor_param: String,
}

fn default_jwt_secret_env() -> String {
    "SUPABASE_JWT_SECRET".to_string()
}

fn default_audience() -> String {
    "authenticated".to_string()
}

fn default_cookie_name() -> String {
    "user-session".to_string()
}

fn default_visitor_param() -> String {
    "visitor_id".to_string()
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret_env: default_jwt_secret_env(),
            audience: default_audience(),
            cookie_name: default_cookie_name(),
            visitor_param: default_visitor_param(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database location. `None` means `{data_dir}/shurahub.db`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub url: Option<String>,
}
