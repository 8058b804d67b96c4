//! Application error type mapping to HTTP status codes and the chat
//! response format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use ufdr_types::chat::ChatResponse;
use ufdr_types::error::{EmbeddingError, StoreError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Embedding failures (bad input, unreachable image URL, model).
    Embedding(EmbeddingError),
    /// Vector or graph store failures.
    Store(StoreError),
    /// Malformed request.
    Validation(String),
}

impl From<EmbeddingError> for AppError {
    fn from(e: EmbeddingError) -> Self {
        AppError::Embedding(e)
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Embedding(EmbeddingError::Encode(_)) => StatusCode::BAD_REQUEST,
            AppError::Embedding(EmbeddingError::Network(_)) => StatusCode::BAD_GATEWAY,
            AppError::Embedding(EmbeddingError::ModelLoad(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Store(e) if e.is_connection() => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Store(_) => StatusCode::BAD_GATEWAY,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppError::Embedding(e) => e.to_string(),
            AppError::Store(e) => e.to_string(),
            AppError::Validation(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, error = %self.message(), "request failed");
        } else {
            tracing::debug!(%status, error = %self.message(), "request rejected");
        }
        (status, Json(ChatResponse::error(self.message()))).into_response()
    }
}
