//! Image inputs accepted by the image embedder.

use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::EmbeddingError;

/// Channel layout of a raw pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    Luma,
    LumaAlpha,
    Rgb,
    Rgba,
}

impl PixelLayout {
    pub fn channels(&self) -> usize {
        match self {
            PixelLayout::Luma => 1,
            PixelLayout::LumaAlpha => 2,
            PixelLayout::Rgb => 3,
            PixelLayout::Rgba => 4,
        }
    }
}

/// Row-major 8-bit pixel data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPixels {
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
    pub data: Vec<u8>,
}

impl RawPixels {
    /// Number of bytes `data` must hold for the declared shape.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.layout.channels()
    }
}

/// A single image to embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageInput {
    /// Image file on local disk.
    Path(PathBuf),
    /// `http://` or `https://` URL, fetched on each call without retry.
    Url(String),
    /// Encoded image bytes (PNG, JPEG, ...).
    Encoded(Vec<u8>),
    /// Already decoded pixels.
    Pixels(RawPixels),
}

impl ImageInput {
    /// Interpret a string the way a caller passing "a path or a URL" means it.
    pub fn from_str_source(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            ImageInput::Url(source.to_string())
        } else {
            ImageInput::Path(PathBuf::from(source))
        }
    }

    /// Decode a base64 payload (optionally a `data:` URI) into encoded bytes.
    pub fn from_base64(payload: &str) -> Result<Self, EmbeddingError> {
        let data = match payload.split_once(";base64,") {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest,
            _ => payload,
        };
        STANDARD
            .decode(data.trim())
            .map(ImageInput::Encoded)
            .map_err(|e| EmbeddingError::Encode(format!("invalid base64 image data: {e}")))
    }

    /// Short description for logs; never includes pixel or byte content.
    pub fn describe(&self) -> String {
        match self {
            ImageInput::Path(p) => format!("path:{}", p.display()),
            ImageInput::Url(u) => format!("url:{u}"),
            ImageInput::Encoded(b) => format!("bytes:{}", b.len()),
            ImageInput::Pixels(p) => format!("pixels:{}x{}", p.width, p.height),
        }
    }
}

/// An ordered batch of images; a single input becomes a one-element batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageBatch(Vec<ImageInput>);

impl ImageBatch {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ImageInput> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<ImageInput> {
        self.0
    }
}

impl From<ImageInput> for ImageBatch {
    fn from(input: ImageInput) -> Self {
        Self(vec![input])
    }
}

impl From<Vec<ImageInput>> for ImageBatch {
    fn from(inputs: Vec<ImageInput>) -> Self {
        Self(inputs)
    }
}

impl From<&str> for ImageBatch {
    fn from(source: &str) -> Self {
        Self(vec![ImageInput::from_str_source(source)])
    }
}

impl From<RawPixels> for ImageBatch {
    fn from(pixels: RawPixels) -> Self {
        Self(vec![ImageInput::Pixels(pixels)])
    }
}
