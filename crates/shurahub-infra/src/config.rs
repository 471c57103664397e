//! Configuration loader for Shurahub.
//!
//! Reads `config.toml` from the data directory (`~/.shurahub/` in production)
//! and deserializes it into [`ShurahubConfig`], then layers `SHURAHUB_*`
//! environment overrides on top. Falls back to defaults when the file is
//! missing or malformed.

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use shurahub_types::config::{ProviderSettings, ShurahubConfig};
use shurahub_types::error::ConfigError;

use crate::sqlite::pool::default_database_url;

/// Resolve the data directory.
///
/// `$SHURAHUB_DATA_DIR`, else `~/.shurahub`, else `./.shurahub`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SHURAHUB_DATA_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".shurahub"))
        .unwrap_or_else(|| PathBuf::from(".shurahub"))
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: [`ShurahubConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
pub async fn load_config(data_dir: &Path) -> ShurahubConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ShurahubConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ShurahubConfig::default();
        }
    };

    match toml::from_str::<ShurahubConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ShurahubConfig::default()
        }
    }
}

/// Apply `SHURAHUB_MODELS`, `SHURAHUB_BASE_URL`, `SHURAHUB_HOST` and
/// `SHURAHUB_PORT` overrides.
///
/// `lookup` is `std::env::var` in production.
pub fn apply_env_overrides<F>(config: &mut ShurahubConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(models) = lookup("SHURAHUB_MODELS") {
        config.models.pool = models
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(base_url) = lookup("SHURAHUB_BASE_URL") {
        config.provider.base_url = base_url;
    }
    if let Some(host) = lookup("SHURAHUB_HOST") {
        config.server.host = host;
    }
    if let Some(port) = lookup("SHURAHUB_PORT") {
        config.server.port = port.trim().parse().map_err(|e| ConfigError::Invalid {
            field: "SHURAHUB_PORT".to_string(),
            message: format!("{e}"),
        })?;
    }
    Ok(())
}

/// Reject configurations that cannot run a debate.
pub fn validate(config: &ShurahubConfig) -> Result<(), ConfigError> {
    if config.models.pool.iter().all(|m| m.trim().is_empty()) {
        return Err(ConfigError::EmptyModelPool);
    }
    if config.gateway.channel_capacity == 0 {
        return Err(ConfigError::Invalid {
            field: "gateway.channel_capacity".to_string(),
            message: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Load, override from the process environment, and validate.
pub async fn load(data_dir: &Path) -> Result<ShurahubConfig, ConfigError> {
    let mut config = load_config(data_dir).await;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate(&config)?;
    Ok(config)
}

/// Read the provider API key from the environment variable the settings name.
pub fn api_key<F>(settings: &ProviderSettings, lookup: F) -> Result<SecretString, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(&settings.api_key_env) {
        Some(key) if !key.trim().is_empty() => Ok(SecretString::from(key)),
        _ => Err(ConfigError::MissingApiKey(settings.api_key_env.clone())),
    }
}

/// The configured database URL, or the default file under `data_dir`.
pub fn database_url(config: &ShurahubConfig, data_dir: &Path) -> String {
    config
        .database
        .url
        .clone()
        .unwrap_or_else(|| default_database_url(data_dir))
}
