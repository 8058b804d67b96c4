//! Encoder port for the shared multimodal model.
//!
//! Defines the blocking inference interface. The fastembed CLIP
//! implementation lives in ufdr-infra.

use ufdr_types::embedding::ComputeDevice;
use ufdr_types::error::EmbeddingError;

/// Loaded encoder weights plus the device they run on.
///
/// One instance is created per process and shared read-only by all
/// embedding calls. Both modalities must produce rows of `dimension()`
/// width in the same similarity space.
///
/// Methods block the calling thread for the duration of inference.
pub trait ClipEncoder: Send + Sync {
    /// Name of the pretrained model (e.g. "openai/clip-vit-base-patch32").
    fn model_name(&self) -> &str;

    /// Device selected at load time. Never changes afterwards.
    fn device(&self) -> ComputeDevice;

    /// Width of every output row, for both modalities.
    fn dimension(&self) -> usize;

    /// Token limit for text input; longer texts are truncated.
    fn max_sequence_length(&self) -> usize;

    /// Raw (un-normalized) text features, one row per input text.
    fn encode_text(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Raw (un-normalized) image features, one row per encoded RGB image.
    fn encode_images(&self, images: &[Vec<u8>]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}
