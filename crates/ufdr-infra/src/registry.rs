//! Client registry -- the single shared vector and graph store clients.
//!
//! `ClientRegistry` owns one [`ClientSlot`] per store and is normally held by
//! the application state. The free functions at the bottom expose a
//! process-wide registry built from environment configuration for callers
//! that have no state to pass around.

use std::sync::{Arc, OnceLock};

use ufdr_core::store::ClientSlot;
use ufdr_types::config::AppConfig;
use ufdr_types::error::{ConfigError, StoreError};

use crate::graph::Neo4jClient;
use crate::vector::ChromaClient;

/// Lazily connected store clients sharing one configuration.
pub struct ClientRegistry {
    config: AppConfig,
    vector: ClientSlot<ChromaClient>,
    graph: ClientSlot<Neo4jClient>,
}

impl ClientRegistry {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            vector: ClientSlot::new("chroma"),
            graph: ClientSlot::new("neo4j"),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The shared Chroma client, connecting on first use.
    pub async fn get_vector_store_client(&self) -> Result<Arc<ChromaClient>, StoreError> {
        self.vector
            .get_or_try_init(|| ChromaClient::connect(&self.config.vector))
            .await
    }

    /// The shared Neo4j client, connecting on first use.
    pub async fn get_graph_store_client(&self) -> Result<Arc<Neo4jClient>, StoreError> {
        self.graph
            .get_or_try_init(|| Neo4jClient::connect(&self.config.graph))
            .await
    }

    /// Close the Chroma client if one is live. The next get reconnects.
    pub async fn close_vector_store_client(&self) -> bool {
        self.vector.close().await
    }

    /// Close the Neo4j client if one is live. The next get reconnects.
    pub async fn close_graph_store_client(&self) -> bool {
        self.graph.close().await
    }

    pub async fn close_all(&self) {
        self.close_vector_store_client().await;
        self.close_graph_store_client().await;
    }
}

static GLOBAL: OnceLock<ClientRegistry> = OnceLock::new();

/// The process-wide registry, configured from the environment on first use.
pub fn global() -> Result<&'static ClientRegistry, ConfigError> {
    if let Some(registry) = GLOBAL.get() {
        return Ok(registry);
    }
    let config = crate::config::config_from_env()?;
    Ok(GLOBAL.get_or_init(|| ClientRegistry::new(config)))
}

pub async fn get_vector_store_client() -> Result<Arc<ChromaClient>, StoreError> {
    global()
        .map_err(|e| StoreError::connection("chroma", e.to_string()))?
        .get_vector_store_client()
        .await
}

pub async fn get_graph_store_client() -> Result<Arc<Neo4jClient>, StoreError> {
    global()
        .map_err(|e| StoreError::connection("neo4j", e.to_string()))?
        .get_graph_store_client()
        .await
}

pub async fn close_vector_store_client() {
    if let Some(registry) = GLOBAL.get() {
        registry.close_vector_store_client().await;
    }
}

pub async fn close_graph_store_client() {
    if let Some(registry) = GLOBAL.get() {
        registry.close_graph_store_client().await;
    }
}

#[cfg(test)]
mod tests {
    use mockito::Server;
    use ufdr_core::store::StoreClient;
    use ufdr_types::config::{GraphStoreConfig, VectorStoreConfig};

    use super::*;

    const COLLECTION_PATH: &str =
        "/api/v2/tenants/default_tenant/databases/default_database/collections/ufdr_reports";

    fn unreachable_config() -> AppConfig {
        AppConfig {
            vector: VectorStoreConfig {
                host: "127.0.0.1".to_string(),
                port: 1,
                timeout_secs: 2,
                ..VectorStoreConfig::default()
            },
            graph: GraphStoreConfig {
                uri: "bolt://127.0.0.1:1".to_string(),
                timeout_secs: 2,
                ..GraphStoreConfig::default()
            },
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn test_vector_client_is_shared_until_closed() {
        let mut server = Server::new_async().await;
        let _hb = server
            .mock("GET", "/api/v2/heartbeat")
            .with_status(200)
            .with_body(r#"{"nanosecond heartbeat": 1}"#)
            .create_async()
            .await;
        let get = server
            .mock("GET", COLLECTION_PATH)
            .with_status(200)
            .with_body(r#"{"id":"c-1","name":"ufdr_reports","metadata":null}"#)
            .expect(2)
            .create_async()
            .await;

        let addr = server.socket_address();
        let registry = ClientRegistry::new(AppConfig {
            vector: VectorStoreConfig {
                host: addr.ip().to_string(),
                port: addr.port(),
                ..VectorStoreConfig::default()
            },
            ..AppConfig::default()
        });

        let a = registry.get_vector_store_client().await.unwrap();
        let b = registry.get_vector_store_client().await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        assert!(registry.close_vector_store_client().await);
        assert!(a.is_closed());
        assert!(!registry.close_vector_store_client().await);

        let c = registry.get_vector_store_client().await.unwrap();
        assert_ne!(a.session_id(), c.session_id());
        get.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_stores_fail_and_stay_empty() {
        let registry = ClientRegistry::new(unreachable_config());

        let err = registry.get_vector_store_client().await.err().unwrap();
        assert!(err.is_connection());
        let err = registry.get_graph_store_client().await.err().unwrap();
        assert!(err.is_connection());

        assert!(!registry.close_vector_store_client().await);
        assert!(!registry.close_graph_store_client().await);
    }

    #[tokio::test]
    async fn test_close_all_on_empty_registry() {
        let registry = ClientRegistry::new(AppConfig::default());
        registry.close_all().await;
        registry.close_all().await;
    }
}
