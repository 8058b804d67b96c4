//! Vector store infrastructure.

pub mod chroma;

pub use chroma::{ChromaClient, Collection};
