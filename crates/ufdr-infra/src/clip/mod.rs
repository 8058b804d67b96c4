//! CLIP encoder infrastructure.
//!
//! `encoder` loads the fastembed CLIP sessions, `device` picks the ONNX
//! execution providers, and `image` resolves image inputs to RGB bytes.

pub mod device;
pub mod encoder;
pub mod image;

pub use self::encoder::FastEmbedClip;
pub use self::image::HttpImageResolver;
