use std::time::Duration;

use thiserror::Error;

/// Errors raised while loading the encoder or producing embeddings.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// The named model could not be fetched or initialized. Fatal at startup.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The input could not be encoded (bad image data, empty batch, degenerate vector).
    #[error("encode error: {0}")]
    Encode(String),

    /// An image URL could not be fetched. Not retried.
    #[error("network error: {0}")]
    Network(String),
}

/// Errors from the vector and graph store clients.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{store} connection error: {message}")]
    Connection { store: &'static str, message: String },

    #[error("{store} did not respond within {after:?}")]
    Timeout { store: &'static str, after: Duration },

    #[error("store request error: {0}")]
    Request(String),
}

impl StoreError {
    pub fn connection(store: &'static str, message: impl Into<String>) -> Self {
        StoreError::Connection {
            store,
            message: message.into(),
        }
    }

    /// Whether this error means the client could not be established.
    ///
    /// Timeouts during connect count as connection failures.
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            StoreError::Connection { .. } | StoreError::Timeout { .. }
        )
    }
}

/// Errors related to configuration resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration value: {0}")]
    Missing(String),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_error_display() {
        let err = EmbeddingError::Network("404 Not Found".to_string());
        assert_eq!(err.to_string(), "network error: 404 Not Found");
    }

    #[test]
    fn test_store_error_connection_display() {
        let err = StoreError::connection("neo4j", "connection refused");
        assert_eq!(err.to_string(), "neo4j connection error: connection refused");
        assert!(err.is_connection());
    }

    #[test]
    fn test_timeout_counts_as_connection_failure() {
        let err = StoreError::Timeout {
            store: "chroma",
            after: Duration::from_secs(10),
        };
        assert!(err.is_connection());
        assert!(!StoreError::Request("bad".to_string()).is_connection());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid {
            key: "CHROMA_PORT".to_string(),
            message: "not a number".to_string(),
        };
        assert_eq!(err.to_string(), "invalid value for CHROMA_PORT: not a number");
    }
}
