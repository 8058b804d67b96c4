//! Text façade over the shared embedding model.

use ufdr_types::embedding::{ComputeDevice, Embedding, TextBatch};
use ufdr_types::error::EmbeddingError;

use super::model::EmbeddingModel;

/// Turns text into normalized embeddings.
///
/// Inference runs on tokio's blocking pool so request handlers stay responsive.
#[derive(Debug, Clone)]
pub struct TextEmbedder {
    model: EmbeddingModel,
}

impl TextEmbedder {
    pub fn new(model: EmbeddingModel) -> Self {
        Self { model }
    }

    /// Embed one string or an ordered list of strings.
    ///
    /// Always returns one row per input, even for a single string. Over-length
    /// input is truncated to [`max_sequence_length`](Self::max_sequence_length)
    /// tokens without error.
    pub async fn embed_text(&self, texts: impl Into<TextBatch>) -> Result<Vec<Embedding>, EmbeddingError> {
        let texts = texts.into();
        let model = self.model.clone();
        tokio::task::spawn_blocking(move || model.embed_text_blocking(texts))
            .await
            .map_err(|e| EmbeddingError::Encode(format!("text embedding task failed: {e}")))?
    }

    /// Embed and return only the first row.
    ///
    /// A multi-item batch is accepted; the remaining rows are discarded.
    pub async fn embed_single_text(&self, texts: impl Into<TextBatch>) -> Result<Embedding, EmbeddingError> {
        self.embed_text(texts)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::Encode("no embedding generated".to_string()))
    }

    pub fn get_embedding_dimension(&self) -> usize {
        self.model.dimension()
    }

    pub fn max_sequence_length(&self) -> usize {
        self.model.max_sequence_length()
    }

    pub fn device(&self) -> ComputeDevice {
        self.model.device()
    }

    pub fn model(&self) -> &EmbeddingModel {
        &self.model
    }
}
