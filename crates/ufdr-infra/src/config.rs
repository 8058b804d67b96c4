//! Configuration loader.
//!
//! Reads `config.toml` from the data directory (`~/.ufdr/` by default) and
//! deserializes it into [`AppConfig`], then applies environment overrides.
//! A missing or malformed file falls back to defaults; a malformed
//! environment value is an error because it names a concrete intent.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use ufdr_types::config::AppConfig;
use ufdr_types::embedding::DevicePreference;
use ufdr_types::error::ConfigError;

pub const ENV_DATA_DIR: &str = "UFDR_DATA_DIR";
pub const ENV_NEO4J_URI: &str = "NEO4J_URI";
pub const ENV_NEO4J_USER: &str = "NEO4J_USER";
pub const ENV_NEO4J_PASSWORD: &str = "NEO4J_PASSWORD";
pub const ENV_CHROMA_HOST: &str = "CHROMA_HOST";
pub const ENV_CHROMA_PORT: &str = "CHROMA_PORT";
pub const ENV_CHROMA_COLLECTION: &str = "CHROMA_COLLECTION";
pub const ENV_CLIP_MODEL: &str = "UFDR_CLIP_MODEL";
pub const ENV_DEVICE: &str = "UFDR_DEVICE";

/// Resolve the data directory.
///
/// Priority: `UFDR_DATA_DIR`, then `~/.ufdr`, then `./.ufdr`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".ufdr");
    }

    PathBuf::from(".ufdr")
}

/// Load `{data_dir}/config.toml` and apply process environment overrides.
pub async fn load_config(data_dir: &Path) -> Result<AppConfig, ConfigError> {
    let config = load_config_file(data_dir).await;
    apply_env_overrides(config, |key| std::env::var(key).ok())
}

/// Configuration from the process environment only (no file).
pub fn config_from_env() -> Result<AppConfig, ConfigError> {
    apply_env_overrides(AppConfig::default(), |key| std::env::var(key).ok())
}

/// Read `{data_dir}/config.toml`, falling back to defaults.
pub async fn load_config_file(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AppConfig::default()
        }
    }
}

/// Apply environment overrides using `lookup` to read variables.
///
/// Empty values are treated as unset.
pub fn apply_env_overrides<F>(mut config: AppConfig, lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(uri) = get(ENV_NEO4J_URI) {
        config.graph.uri = uri;
    }
    if let Some(user) = get(ENV_NEO4J_USER) {
        config.graph.username = user;
    }
    if let Some(password) = get(ENV_NEO4J_PASSWORD) {
        config.graph.password = SecretString::from(password);
    }

    if let Some(host) = get(ENV_CHROMA_HOST) {
        config.vector.host = host;
    }
    if let Some(port) = get(ENV_CHROMA_PORT) {
        config.vector.port = port.trim().parse().map_err(|e| ConfigError::Invalid {
            key: ENV_CHROMA_PORT.to_string(),
            message: format!("'{port}' is not a valid port: {e}"),
        })?;
    }
    if let Some(collection) = get(ENV_CHROMA_COLLECTION) {
        config.vector.collection = collection;
    }

    if let Some(model) = get(ENV_CLIP_MODEL) {
        config.embedding.model_name = model;
    }
    if let Some(device) = get(ENV_DEVICE) {
        config.embedding.device = device
            .parse::<DevicePreference>()
            .map_err(|message| ConfigError::Invalid {
                key: ENV_DEVICE.to_string(),
                message,
            })?;
    }

    Ok(config)
}
