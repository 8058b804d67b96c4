//! FastEmbed-based CLIP encoder.
//!
//! Implements [`ClipEncoder`] using fastembed's ClipVitB32 text and vision
//! models (512 dimensions, one shared similarity space) with ONNX runtime
//! inference. Both sessions are created once, on the device selected at
//! load, and each sits behind a mutex because inference needs `&mut`.

use std::sync::{Mutex, MutexGuard};

use fastembed::{
    EmbeddingModel as TextModel, ImageEmbedding, ImageEmbeddingModel, ImageInitOptions,
    InitOptions, TextEmbedding,
};

use ufdr_core::embedding::ClipEncoder;
use ufdr_types::config::EmbeddingConfig;
use ufdr_types::embedding::ComputeDevice;
use ufdr_types::error::EmbeddingError;

use super::device::{execution_providers, select_device};

/// Output width of CLIP ViT-B/32 for both modalities.
pub const CLIP_VIT_B32_DIMENSION: usize = 512;

/// CLIP text context length in tokens.
pub const CLIP_MAX_SEQUENCE_LENGTH: usize = 77;

/// Names accepted for the CLIP ViT-B/32 pair.
const CLIP_VIT_B32_ALIASES: &[&str] = &[
    "openai/clip-vit-base-patch32",
    "qdrant/clip-vit-b-32-text",
    "qdrant/clip-vit-b-32-vision",
    "clip-vit-b-32",
    "clipvitb32",
];

/// Check that `model_name` names a supported CLIP pair.
///
/// There is no fallback model: an unknown name fails the load.
pub fn resolve_model(model_name: &str) -> Result<(TextModel, ImageEmbeddingModel), EmbeddingError> {
    let normalized = model_name.trim().to_lowercase();
    if CLIP_VIT_B32_ALIASES.contains(&normalized.as_str()) {
        Ok((TextModel::ClipVitB32, ImageEmbeddingModel::ClipVitB32))
    } else {
        Err(EmbeddingError::ModelLoad(format!(
            "unsupported model '{model_name}' (supported: {})",
            CLIP_VIT_B32_ALIASES.join(", ")
        )))
    }
}

/// Local CLIP encoder backed by two fastembed ONNX sessions.
pub struct FastEmbedClip {
    model_name: String,
    device: ComputeDevice,
    text: Mutex<TextEmbedding>,
    vision: Mutex<ImageEmbedding>,
}

impl FastEmbedClip {
    /// Load the named model onto the configured device.
    ///
    /// Downloads weights into the cache on first use. Any failure is a
    /// [`EmbeddingError::ModelLoad`].
    pub fn load(config: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let (text_model, image_model) = resolve_model(&config.model_name)?;
        let device = select_device(config.device)?;

        let mut text_options = InitOptions::new(text_model)
            .with_execution_providers(execution_providers(device))
            .with_max_length(CLIP_MAX_SEQUENCE_LENGTH)
            .with_show_download_progress(config.show_download_progress);
        let mut image_options = ImageInitOptions::new(image_model)
            .with_execution_providers(execution_providers(device))
            .with_show_download_progress(config.show_download_progress);
        if let Some(cache_dir) = &config.cache_dir {
            text_options = text_options.with_cache_dir(cache_dir.clone());
            image_options = image_options.with_cache_dir(cache_dir.clone());
        }

        let text = TextEmbedding::try_new(text_options).map_err(|e| {
            tracing::error!("Failed to load CLIP text model '{}': {e}", config.model_name);
            EmbeddingError::ModelLoad(format!("text encoder: {e}"))
        })?;
        let vision = ImageEmbedding::try_new(image_options).map_err(|e| {
            tracing::error!("Failed to load CLIP vision model '{}': {e}", config.model_name);
            EmbeddingError::ModelLoad(format!("vision encoder: {e}"))
        })?;

        tracing::info!(
            "CLIP model '{}' loaded successfully on {device}",
            config.model_name
        );

        Ok(Self {
            model_name: config.model_name.clone(),
            device,
            text: Mutex::new(text),
            vision: Mutex::new(vision),
        })
    }
}

impl ClipEncoder for FastEmbedClip {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn device(&self) -> ComputeDevice {
        self.device
    }

    fn dimension(&self) -> usize {
        CLIP_VIT_B32_DIMENSION
    }

    fn max_sequence_length(&self) -> usize {
        CLIP_MAX_SEQUENCE_LENGTH
    }

    fn encode_text(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        lock_session(&self.text)
            .embed(texts.to_vec(), None)
            .map_err(|e| EmbeddingError::Encode(format!("text inference failed: {e}")))
    }

    fn encode_images(&self, images: &[Vec<u8>]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let refs: Vec<&[u8]> = images.iter().map(Vec::as_slice).collect();
        lock_session(&self.vision)
            .embed_bytes(&refs, None)
            .map_err(|e| EmbeddingError::Encode(format!("image inference failed: {e}")))
    }
}

/// A panic inside a previous call leaves the session itself usable.
fn lock_session<T>(session: &Mutex<T>) -> MutexGuard<'_, T> {
    session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_aliases_case_insensitively() {
        for name in ["openai/clip-vit-base-patch32", "Qdrant/clip-ViT-B-32-text", "CLIP-ViT-B-32"] {
            assert!(resolve_model(name).is_ok(), "{name} should resolve");
        }
    }

    #[test]
    fn unknown_model_is_load_error() {
        let err = resolve_model("sentence-transformers/all-MiniLM-L6-v2").unwrap_err();
        assert!(matches!(err, EmbeddingError::ModelLoad(_)));
    }

    #[test]
    fn unknown_model_fails_before_device_probe() {
        let config = EmbeddingConfig {
            model_name: "no-such-model".to_string(),
            ..EmbeddingConfig::default()
        };
        assert!(matches!(
            FastEmbedClip::load(&config),
            Err(EmbeddingError::ModelLoad(_))
        ));
    }

    #[test]
    fn poisoned_session_lock_is_recovered() {
        let session = std::sync::Arc::new(Mutex::new(vec![1u8]));
        let poisoner = std::sync::Arc::clone(&session);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("inference panicked");
        })
        .join();
        assert!(session.is_poisoned());

        lock_session(&session).push(2);
        assert_eq!(*lock_session(&session), vec![1, 2]);
    }

    // Downloads ~600 MB of weights; run with `cargo test -- --ignored`.
    #[test]
    #[ignore]
    fn real_model_text_and_image_share_dimension() {
        let clip = FastEmbedClip::load(&EmbeddingConfig::default()).unwrap();
        let text = clip.encode_text(&["a photo of a cat".to_string()]).unwrap();
        assert_eq!(text[0].len(), CLIP_VIT_B32_DIMENSION);

        let mut png = Vec::new();
        image::RgbImage::from_pixel(32, 32, image::Rgb([200, 30, 30]))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let img = clip.encode_images(&[png]).unwrap();
        assert_eq!(img[0].len(), CLIP_VIT_B32_DIMENSION);
    }
}
