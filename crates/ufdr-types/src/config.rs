//! Configuration types for the embedding model and the two backing stores.
//!
//! `AppConfig` represents the optional `config.toml` in the data directory.
//! All fields have defaults; environment variables are applied on top by the
//! loader in `ufdr-infra`. The graph password is never read from the file.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::embedding::DevicePreference;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub vector: VectorStoreConfig,

    #[serde(default)]
    pub graph: GraphStoreConfig,
}

/// Settings for the shared multimodal encoder.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    /// Pretrained model name shared by the text and image embedders.
    #[serde(default = "default_model_name")]
    pub model_name: String,

    #[serde(default)]
    pub device: DevicePreference,

    /// Where model weights are cached. `None` uses fastembed's default.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Timeout for fetching image URLs.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(default)]
    pub show_download_progress: bool,
}

pub const DEFAULT_MODEL_NAME: &str = "openai/clip-vit-base-patch32";

fn default_model_name() -> String {
    DEFAULT_MODEL_NAME.to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

impl EmbeddingConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_name: default_model_name(),
            device: DevicePreference::default(),
            cache_dir: None,
            fetch_timeout_secs: default_fetch_timeout_secs(),
            show_download_progress: false,
        }
    }
}

/// Connection settings for the vector index service.
#[derive(Debug, Clone, Deserialize)]
pub struct VectorStoreConfig {
    #[serde(default = "default_chroma_host")]
    pub host: String,

    #[serde(default = "default_chroma_port")]
    pub port: u16,

    #[serde(default = "default_collection")]
    pub collection: String,

    #[serde(default = "default_tenant")]
    pub tenant: String,

    #[serde(default = "default_database")]
    pub database: String,

    /// Permit the administrative reset operation.
    #[serde(default = "default_true")]
    pub allow_reset: bool,

    /// Usage reporting is disabled by policy; a `true` here is ignored.
    #[serde(default)]
    pub anonymized_telemetry: bool,

    #[serde(default = "default_store_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_chroma_host() -> String {
    "localhost".to_string()
}

fn default_chroma_port() -> u16 {
    8000
}

fn default_collection() -> String {
    "ufdr_reports".to_string()
}

fn default_tenant() -> String {
    "default_tenant".to_string()
}

fn default_database() -> String {
    "default_database".to_string()
}

fn default_true() -> bool {
    true
}

fn default_store_timeout_secs() -> u64 {
    10
}

impl VectorStoreConfig {
    /// Base URL of the HTTP API, e.g. `http://localhost:8000`.
    ///
    /// A host that already carries a scheme is used as-is.
    pub fn base_url(&self) -> String {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            format!("{}:{}", self.host.trim_end_matches('/'), self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            host: default_chroma_host(),
            port: default_chroma_port(),
            collection: default_collection(),
            tenant: default_tenant(),
            database: default_database(),
            allow_reset: true,
            anonymized_telemetry: false,
            timeout_secs: default_store_timeout_secs(),
        }
    }
}

/// Connection settings for the graph database.
#[derive(Debug, Deserialize)]
pub struct GraphStoreConfig {
    #[serde(default = "default_graph_uri")]
    pub uri: String,

    #[serde(default = "default_graph_user")]
    pub username: String,

    /// Only ever supplied through `NEO4J_PASSWORD` or an explicit override.
    #[serde(skip, default = "empty_secret")]
    pub password: SecretString,

    /// Target database; `None` uses the server default.
    #[serde(default)]
    pub database: Option<String>,

    #[serde(default = "default_store_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_graph_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_graph_user() -> String {
    "neo4j".to_string()
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

impl GraphStoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Clone for GraphStoreConfig {
    fn clone(&self) -> Self {
        Self {
            uri: self.uri.clone(),
            username: self.username.clone(),
            password: SecretString::from(self.password.expose_secret().to_string()),
            database: self.database.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

impl Default for GraphStoreConfig {
    fn default() -> Self {
        Self {
            uri: default_graph_uri(),
            username: default_graph_user(),
            password: empty_secret(),
            database: None,
            timeout_secs: default_store_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.embedding.model_name, DEFAULT_MODEL_NAME);
        assert_eq!(config.embedding.device, DevicePreference::Auto);
        assert_eq!(config.vector.port, 8000);
        assert_eq!(config.vector.collection, "ufdr_reports");
        assert!(!config.vector.anonymized_telemetry);
        assert_eq!(config.graph.uri, "bolt://localhost:7687");
        assert!(config.graph.password.expose_secret().is_empty());
    }

    #[test]
    fn test_app_config_deserialize_with_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.vector.host, "localhost");
        assert_eq!(config.graph.timeout_secs, 10);
    }

    #[test]
    fn test_app_config_deserialize_with_values() {
        let toml_str = r#"
[embedding]
device = "cpu"
fetch_timeout_secs = 5

[vector]
host = "chroma.internal"
port = 9000
collection = "reports"

[graph]
uri = "neo4j://graph.internal:7687"
username = "analyst"
database = "ufdr"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.embedding.device, DevicePreference::Cpu);
        assert_eq!(config.embedding.fetch_timeout(), Duration::from_secs(5));
        assert_eq!(config.vector.base_url(), "http://chroma.internal:9000");
        assert_eq!(config.vector.collection, "reports");
        assert_eq!(config.graph.username, "analyst");
        assert_eq!(config.graph.database.as_deref(), Some("ufdr"));
    }

    #[test]
    fn test_password_is_not_read_from_file() {
        let toml_str = r#"
[graph]
password = "hunter2"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert!(config.graph.password.expose_secret().is_empty());
    }

    #[test]
    fn test_base_url_keeps_explicit_scheme() {
        let config = VectorStoreConfig {
            host: "https://chroma.example.com".to_string(),
            port: 443,
            ..VectorStoreConfig::default()
        };
        assert_eq!(config.base_url(), "https://chroma.example.com:443");
    }

    #[test]
    fn test_graph_config_debug_redacts_password() {
        let config = GraphStoreConfig {
            password: SecretString::from("hunter2"),
            ..GraphStoreConfig::default()
        };
        assert!(!format!("{config:?}").contains("hunter2"));
        assert_eq!(config.clone().password.expose_secret(), "hunter2");
    }
}
