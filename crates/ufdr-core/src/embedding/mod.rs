//! Multimodal embedding: one shared encoder, two typed façades.
//!
//! `EmbeddingModel` owns the encoder handle and the normalization contract.
//! `TextEmbedder` and `ImageEmbedder` are cheap clones over the same model,
//! so text and image vectors always share dimension and similarity space.

pub mod encoder;
pub mod image;
pub mod model;
pub mod normalize;
pub mod text;

pub use encoder::ClipEncoder;
pub use image::{ImageEmbedder, ImageResolver};
pub use model::EmbeddingModel;
pub use normalize::normalize;
pub use text::TextEmbedder;
