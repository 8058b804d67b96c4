//! Infrastructure layer for UFDR.
//!
//! Concrete implementations of the ports defined in `ufdr-core`: the
//! fastembed CLIP encoder and image loading, the Chroma and Neo4j store
//! clients, the client registry and the configuration loader.

pub mod clip;
pub mod config;
pub mod graph;
pub mod registry;
pub mod vector;
