//! L2 normalization of raw feature rows.

use ufdr_types::embedding::Embedding;
use ufdr_types::error::EmbeddingError;

/// Scale `raw` to unit Euclidean norm (`v / ||v||`).
///
/// A zero or non-finite norm cannot be normalized and is reported as an
/// encode error instead of producing NaNs.
pub fn normalize(raw: Vec<f32>) -> Result<Embedding, EmbeddingError> {
    if raw.is_empty() {
        return Err(EmbeddingError::Encode("encoder returned an empty feature vector".to_string()));
    }

    let norm = raw.iter().map(|v| v * v).sum::<f32>().sqrt();
    if !norm.is_finite() {
        return Err(EmbeddingError::Encode(format!(
            "feature vector has non-finite norm ({norm})"
        )));
    }
    if norm == 0.0 {
        return Err(EmbeddingError::Encode(
            "feature vector has zero norm and cannot be normalized".to_string(),
        ));
    }

    Ok(Embedding::from_normalized(
        raw.into_iter().map(|v| v / norm).collect(),
    ))
}
