//! Image façade over the shared embedding model.
//!
//! Inputs are first resolved to encoded 3-channel RGB bytes by an
//! [`ImageResolver`] (file read, URL fetch, pixel conversion), then encoded
//! by the same model the text embedder uses.

use std::sync::Arc;

use ufdr_types::embedding::{ComputeDevice, Embedding};
use ufdr_types::error::EmbeddingError;
use ufdr_types::image::{ImageBatch, ImageInput};

use super::model::EmbeddingModel;

/// Turns any [`ImageInput`] into encoded RGB image bytes.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Implementations live in ufdr-infra.
pub trait ImageResolver: Send + Sync {
    /// Resolve one input. URL fetch failures are `EmbeddingError::Network`;
    /// unreadable or undecodable data is `EmbeddingError::Encode`.
    fn resolve(
        &self,
        input: &ImageInput,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, EmbeddingError>> + Send;
}

/// Turns images into normalized embeddings in the text embedder's space.
pub struct ImageEmbedder<R> {
    model: EmbeddingModel,
    resolver: Arc<R>,
}

impl<R> Clone for ImageEmbedder<R> {
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<R: ImageResolver> ImageEmbedder<R> {
    pub fn new(model: EmbeddingModel, resolver: R) -> Self {
        Self {
            model,
            resolver: Arc::new(resolver),
        }
    }

    /// Embed one image or an ordered list of images.
    ///
    /// Inputs are resolved in order; the first failure aborts the call.
    pub async fn embed_image(&self, images: impl Into<ImageBatch>) -> Result<Vec<Embedding>, EmbeddingError> {
        let images = images.into();
        let mut encoded = Vec::with_capacity(images.len());
        for input in images.iter() {
            let bytes = self.resolver.resolve(input).await.inspect_err(|e| {
                tracing::warn!(input = %input.describe(), error = %e, "failed to load image");
            })?;
            encoded.push(bytes);
        }

        let model = self.model.clone();
        tokio::task::spawn_blocking(move || model.embed_images_blocking(encoded))
            .await
            .map_err(|e| EmbeddingError::Encode(format!("image embedding task failed: {e}")))?
    }

    /// Embed and return only the first row.
    pub async fn embed_single_image(&self, images: impl Into<ImageBatch>) -> Result<Embedding, EmbeddingError> {
        self.embed_image(images)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::Encode("no embedding generated".to_string()))
    }

    pub fn get_embedding_dimension(&self) -> usize {
        self.model.dimension()
    }

    pub fn device(&self) -> ComputeDevice {
        self.model.device()
    }

    pub fn model(&self) -> &EmbeddingModel {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::model::testing::test_model;
    use crate::embedding::text::TextEmbedder;

    /// Passes encoded bytes through; treats URLs as unreachable.
    struct PassthroughResolver;

    impl ImageResolver for PassthroughResolver {
        async fn resolve(&self, input: &ImageInput) -> Result<Vec<u8>, EmbeddingError> {
            match input {
                ImageInput::Encoded(bytes) => Ok(bytes.clone()),
                ImageInput::Url(url) => Err(EmbeddingError::Network(format!("unreachable: {url}"))),
                other => Err(EmbeddingError::Encode(format!("unsupported: {}", other.describe()))),
            }
        }
    }

    fn embedder(dimension: usize) -> ImageEmbedder<PassthroughResolver> {
        ImageEmbedder::new(test_model(dimension), PassthroughResolver)
    }

    #[tokio::test]
    async fn test_identical_bytes_are_deterministic() {
        let embedder = embedder(128);
        let bytes = vec![7u8, 1, 2, 3, 250];
        let a = embedder
            .embed_single_image(ImageInput::Encoded(bytes.clone()))
            .await
            .unwrap();
        let b = embedder
            .embed_single_image(ImageInput::Encoded(bytes))
            .await
            .unwrap();
        assert!(a.cosine_similarity(&b).unwrap() >= 0.999);
        assert!(a.is_unit());
    }

    #[tokio::test]
    async fn test_batch_returns_row_per_image() {
        let embedder = embedder(32);
        let rows = embedder
            .embed_image(vec![
                ImageInput::Encoded(vec![1]),
                ImageInput::Encoded(vec![2]),
            ])
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_ne!(rows[0], rows[1]);
    }

    #[tokio::test]
    async fn test_network_failure_propagates() {
        let embedder = embedder(32);
        let err = embedder
            .embed_image("https://unreachable.invalid/a.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::Network(_)));
    }

    #[tokio::test]
    async fn test_degenerate_image_is_encode_error() {
        let embedder = embedder(32);
        let err = embedder
            .embed_image(ImageInput::Encoded(Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::Encode(_)));
    }

    #[tokio::test]
    async fn test_cross_modal_dimension_alignment() {
        let model = test_model(512);
        let text = TextEmbedder::new(model.clone());
        let image = ImageEmbedder::new(model, PassthroughResolver);

        let t = text.embed_text("x").await.unwrap();
        let i = image
            .embed_image(ImageInput::Encoded(vec![9, 9, 9]))
            .await
            .unwrap();

        assert_eq!(text.get_embedding_dimension(), t[0].dimension());
        assert_eq!(image.get_embedding_dimension(), i[0].dimension());
        assert_eq!(t[0].dimension(), i[0].dimension());
        assert!(t[0].cosine_similarity(&i[0]).is_some());
    }
}
