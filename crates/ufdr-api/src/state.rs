//! Application state wiring all services together.
//!
//! AppState holds the shared embedding model and its two façades plus the
//! store client registry. It is built once per process and cloned into
//! every request handler, so the CLIP weights are loaded exactly once.

use std::path::PathBuf;
use std::sync::Arc;

use ufdr_core::embedding::{EmbeddingModel, ImageEmbedder, TextEmbedder};
use ufdr_infra::clip::{FastEmbedClip, HttpImageResolver};
use ufdr_infra::config::{load_config, resolve_data_dir};
use ufdr_infra::registry::ClientRegistry;
use ufdr_types::config::AppConfig;

/// Shared application state.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub text_embedder: TextEmbedder,
    pub image_embedder: ImageEmbedder<HttpImageResolver>,
    pub stores: Arc<ClientRegistry>,
    pub config: Arc<AppConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load configuration and the CLIP model.
    ///
    /// Store clients are not connected here; they connect on first use.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let config = load_config(&data_dir).await?;

        let embedding_config = config.embedding.clone();
        let encoder = tokio::task::spawn_blocking(move || FastEmbedClip::load(&embedding_config)).await??;
        let model = EmbeddingModel::new(Arc::new(encoder));

        Self::from_parts(config, model, data_dir)
    }

    /// Assemble state around an already loaded model.
    pub fn from_parts(config: AppConfig, model: EmbeddingModel, data_dir: PathBuf) -> anyhow::Result<Self> {
        let resolver = HttpImageResolver::new(config.embedding.fetch_timeout())?;

        Ok(Self {
            text_embedder: TextEmbedder::new(model.clone()),
            image_embedder: ImageEmbedder::new(model, resolver),
            stores: Arc::new(ClientRegistry::new(config.clone())),
            config: Arc::new(config),
            data_dir,
        })
    }

    /// Close any live store clients.
    pub async fn shutdown(&self) {
        self.stores.close_all().await;
    }
}
