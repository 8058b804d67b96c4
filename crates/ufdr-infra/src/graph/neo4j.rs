//! Neo4jClient -- Bolt connection to the graph store.
//!
//! The neo4rs `Graph` is a pooled handle that is safe to clone and share
//! between tasks, so callers get clones of it and no extra locking is added
//! around queries. `connect` proves the server answers before returning.

use std::sync::Mutex;

use neo4rs::{query, ConfigBuilder, Graph};
use secrecy::ExposeSecret;
use uuid::Uuid;

use ufdr_core::store::StoreClient;
use ufdr_types::config::GraphStoreConfig;
use ufdr_types::error::StoreError;

const STORE: &str = "neo4j";

/// Live handle to a Neo4j server.
pub struct Neo4jClient {
    graph: Mutex<Option<Graph>>,
    uri: String,
    session_id: Uuid,
}

impl Neo4jClient {
    /// Open a driver for `config.uri` and run a liveness query.
    ///
    /// The probe is bounded by `config.timeout()`. On failure the driver is
    /// dropped and a connection error returned.
    pub async fn connect(config: &GraphStoreConfig) -> Result<Self, StoreError> {
        let mut builder = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.username.as_str())
            .password(config.password.expose_secret());
        if let Some(db) = config.database.as_deref() {
            builder = builder.db(db);
        }
        let driver_config = builder
            .build()
            .map_err(|e| StoreError::connection(STORE, format!("invalid configuration: {e}")))?;

        let timeout = config.timeout();
        let graph = match tokio::time::timeout(timeout, open_and_probe(driver_config)).await {
            Ok(Ok(graph)) => graph,
            Ok(Err(e)) => {
                tracing::warn!(uri = %config.uri, error = %e, "Neo4j connection failed");
                return Err(StoreError::connection(STORE, format!("{}: {e}", config.uri)));
            }
            Err(_) => {
                tracing::warn!(uri = %config.uri, ?timeout, "Neo4j connection timed out");
                return Err(StoreError::Timeout {
                    store: STORE,
                    after: timeout,
                });
            }
        };

        let session_id = Uuid::now_v7();
        tracing::info!(uri = %config.uri, session = %session_id, "connected to Neo4j");

        Ok(Self {
            graph: Mutex::new(Some(graph)),
            uri: config.uri.clone(),
            session_id,
        })
    }

    /// A clone of the live driver handle.
    pub fn graph(&self) -> Result<Graph, StoreError> {
        self.slot()
            .as_ref()
            .cloned()
            .ok_or_else(|| StoreError::connection(STORE, "client is closed"))
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn is_closed(&self) -> bool {
        self.slot().is_none()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Graph>> {
        self.graph.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Build the pool and run `RETURN 1`, draining the result so the pooled
/// connection goes back before the stream is dropped.
async fn open_and_probe(config: neo4rs::Config) -> Result<Graph, neo4rs::Error> {
    let graph = Graph::connect(config).await?;
    {
        let mut rows = graph.execute(query("RETURN 1 AS n")).await?;
        while rows.next().await?.is_some() {}
    }
    Ok(graph)
}

impl StoreClient for Neo4jClient {
    fn session_id(&self) -> Uuid {
        self.session_id
    }

    async fn close(&self) {
        let graph = self.slot().take();
        if graph.is_some() {
            tracing::info!(uri = %self.uri, session = %self.session_id, "Neo4j client closed");
        }
    }
}
