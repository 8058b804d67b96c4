//! EmbeddingModel -- the shared model handle with normalized outputs.
//!
//! Wraps a [`ClipEncoder`] and enforces the output contract: one row per
//! input, every row `dimension()` wide and L2-normalized. Calls here block;
//! the async embedders offload them to tokio's blocking pool.

use std::sync::Arc;

use ufdr_types::embedding::{ComputeDevice, Embedding, TextBatch};
use ufdr_types::error::EmbeddingError;

use super::encoder::ClipEncoder;
use super::normalize::normalize;

/// Process-wide handle to the loaded encoder.
///
/// Cheap to clone; all clones share the same weights and device.
#[derive(Clone)]
pub struct EmbeddingModel {
    encoder: Arc<dyn ClipEncoder>,
}

impl EmbeddingModel {
    pub fn new(encoder: Arc<dyn ClipEncoder>) -> Self {
        tracing::info!(
            model = encoder.model_name(),
            device = %encoder.device(),
            dimension = encoder.dimension(),
            "embedding model ready"
        );
        Self { encoder }
    }

    pub fn model_name(&self) -> &str {
        self.encoder.model_name()
    }

    pub fn device(&self) -> ComputeDevice {
        self.encoder.device()
    }

    /// Output width, fixed by the model configuration.
    pub fn dimension(&self) -> usize {
        self.encoder.dimension()
    }

    /// Text longer than this many tokens is silently truncated.
    pub fn max_sequence_length(&self) -> usize {
        self.encoder.max_sequence_length()
    }

    /// Embed a batch of texts, blocking the current thread.
    pub fn embed_text_blocking(&self, texts: TextBatch) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Err(EmbeddingError::Encode("empty input: no texts to embed".to_string()));
        }

        let raw = self.encoder.encode_text(texts.as_slice())?;
        let embeddings = self.finish(raw, texts.len())?;

        tracing::debug!(
            rows = embeddings.len(),
            dimension = self.dimension(),
            "generated text embeddings"
        );
        Ok(embeddings)
    }

    /// Embed a batch of encoded RGB images, blocking the current thread.
    pub fn embed_images_blocking(&self, images: Vec<Vec<u8>>) -> Result<Vec<Embedding>, EmbeddingError> {
        if images.is_empty() {
            return Err(EmbeddingError::Encode("empty input: no images to embed".to_string()));
        }

        let raw = self.encoder.encode_images(&images)?;
        let embeddings = self.finish(raw, images.len())?;

        tracing::debug!(
            rows = embeddings.len(),
            dimension = self.dimension(),
            "generated image embeddings"
        );
        Ok(embeddings)
    }

    /// Check shape and normalize every row.
    fn finish(&self, raw: Vec<Vec<f32>>, expected_rows: usize) -> Result<Vec<Embedding>, EmbeddingError> {
        if raw.len() != expected_rows {
            return Err(EmbeddingError::Encode(format!(
                "encoder returned {} rows for {expected_rows} inputs",
                raw.len()
            )));
        }

        let dimension = self.dimension();
        raw.into_iter()
            .map(|row| {
                if row.len() != dimension {
                    return Err(EmbeddingError::Encode(format!(
                        "encoder returned a {}-wide row, expected {dimension}",
                        row.len()
                    )));
                }
                normalize(row)
            })
            .collect()
    }
}

impl std::fmt::Debug for EmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingModel")
            .field("model_name", &self.model_name())
            .field("device", &self.device())
            .field("dimension", &self.dimension())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::test_model;
    use super::*;

    struct ShortRowEncoder;

    impl ClipEncoder for ShortRowEncoder {
        fn model_name(&self) -> &str {
            "test/short"
        }
        fn device(&self) -> ComputeDevice {
            ComputeDevice::Cpu
        }
        fn dimension(&self) -> usize {
            8
        }
        fn max_sequence_length(&self) -> usize {
            77
        }
        fn encode_text(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts.iter().map(|_| vec![1.0; 4]).collect())
        }
        fn encode_images(&self, _images: &[Vec<u8>]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_single_text_returns_one_row() {
        let model = test_model(16);
        let rows = model.embed_text_blocking("hello".into()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].dimension(), 16);
        assert!(rows[0].is_unit());
    }

    #[test]
    fn test_batch_rows_are_unit_norm_and_ordered() {
        let model = test_model(32);
        let rows = model
            .embed_text_blocking(vec!["alpha", "beta", "gamma"].into())
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(Embedding::is_unit));

        let beta = model.embed_text_blocking("beta".into()).unwrap();
        assert_eq!(rows[1], beta[0]);
    }

    #[test]
    fn test_empty_batch_is_encode_error() {
        let model = test_model(8);
        let err = model.embed_text_blocking(TextBatch::default()).unwrap_err();
        assert!(matches!(err, EmbeddingError::Encode(_)));

        let err = model.embed_images_blocking(Vec::new()).unwrap_err();
        assert!(matches!(err, EmbeddingError::Encode(_)));
    }

    #[test]
    fn test_zero_feature_row_fails_without_nan() {
        let model = test_model(8);
        let err = model.embed_text_blocking("zero".into()).unwrap_err();
        assert!(matches!(err, EmbeddingError::Encode(_)));

        // The shared model keeps working after a failed call.
        assert!(model.embed_text_blocking("not zero".into()).is_ok());
    }

    #[test]
    fn test_row_width_mismatch_is_rejected() {
        let model = EmbeddingModel::new(Arc::new(ShortRowEncoder));
        let err = model.embed_text_blocking("x".into()).unwrap_err();
        assert!(err.to_string().contains("expected 8"));
    }

    #[test]
    fn test_row_count_mismatch_is_rejected() {
        let model = EmbeddingModel::new(Arc::new(ShortRowEncoder));
        let err = model.embed_images_blocking(vec![vec![1, 2, 3]]).unwrap_err();
        assert!(err.to_string().contains("0 rows for 1 inputs"));
    }

    #[test]
    fn test_clones_share_the_encoder() {
        let model = test_model(8);
        let clone = model.clone();
        assert_eq!(model.model_name(), clone.model_name());
        assert_eq!(
            model.embed_text_blocking("same".into()).unwrap(),
            clone.embed_text_blocking("same".into()).unwrap()
        );
    }
}
