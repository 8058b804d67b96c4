//! Shared domain types for the UFDR assistant.
//!
//! Embeddings, image inputs, chat request/response shapes, configuration
//! structs and the error types used across the workspace.
//!
//! No infrastructure dependencies -- only serde, secrecy, base64, thiserror.

pub mod chat;
pub mod config;
pub mod embedding;
pub mod error;
pub mod image;
