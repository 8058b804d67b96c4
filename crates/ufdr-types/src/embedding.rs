//! Embedding vectors and the inputs used to produce them.
//!
//! An [`Embedding`] is always L2-normalized. Text and image embeddings from
//! the same model share one similarity space, so cosine similarity between
//! them is just the dot product.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Tolerance used when checking that a vector has unit norm.
pub const UNIT_NORM_TOLERANCE: f32 = 1e-5;

/// A fixed-length, unit-norm vector.
///
/// Only constructed through normalization in `ufdr-core`, or via
/// [`Embedding::from_normalized`] when the caller already guarantees unit norm
/// (for example when reading vectors back from a store).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    /// Wrap a vector that is already normalized.
    pub fn from_normalized(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.0
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// Euclidean norm of the vector.
    pub fn norm(&self) -> f32 {
        self.0.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    /// Whether the norm is 1.0 within [`UNIT_NORM_TOLERANCE`].
    pub fn is_unit(&self) -> bool {
        (self.norm() - 1.0).abs() <= UNIT_NORM_TOLERANCE
    }

    /// Cosine similarity with another embedding of the same width.
    ///
    /// Returns `None` when the dimensions differ.
    pub fn cosine_similarity(&self, other: &Embedding) -> Option<f32> {
        if self.dimension() != other.dimension() {
            return None;
        }
        let dot: f32 = self.0.iter().zip(&other.0).map(|(a, b)| a * b).sum();
        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            return None;
        }
        Some(dot / denom)
    }
}

impl AsRef<[f32]> for Embedding {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

/// Compute device the encoder was loaded onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputeDevice {
    Cpu,
    Cuda,
}

impl fmt::Display for ComputeDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputeDevice::Cpu => write!(f, "cpu"),
            ComputeDevice::Cuda => write!(f, "cuda"),
        }
    }
}

/// Device requested in configuration, resolved once at model load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePreference {
    /// Prefer an accelerator when one is available, else the CPU.
    #[default]
    Auto,
    Cpu,
    Cuda,
}

impl FromStr for DevicePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(DevicePreference::Auto),
            "cpu" => Ok(DevicePreference::Cpu),
            "cuda" | "gpu" => Ok(DevicePreference::Cuda),
            other => Err(format!("unknown device '{other}' (expected auto, cpu or cuda)")),
        }
    }
}

/// An ordered batch of texts to embed.
///
/// A single string is always treated as a one-element batch so the output
/// of an embedding call is N rows even for N = 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBatch(Vec<String>);

impl TextBatch {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for TextBatch {
    fn from(text: &str) -> Self {
        Self(vec![text.to_string()])
    }
}

impl From<String> for TextBatch {
    fn from(text: String) -> Self {
        Self(vec![text])
    }
}

impl From<Vec<String>> for TextBatch {
    fn from(texts: Vec<String>) -> Self {
        Self(texts)
    }
}

impl From<Vec<&str>> for TextBatch {
    fn from(texts: Vec<&str>) -> Self {
        Self(texts.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for TextBatch {
    fn from(texts: &[&str]) -> Self {
        Self(texts.iter().map(|t| t.to_string()).collect())
    }
}

impl From<&[String]> for TextBatch {
    fn from(texts: &[String]) -> Self {
        Self(texts.to_vec())
    }
}
