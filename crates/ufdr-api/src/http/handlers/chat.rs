//! Per-report chat endpoint.
//!
//! POST /api/chat/{report_id} - Embed the question (and optional image) and
//! make sure both stores are reachable. Retrieval and answer generation are
//! not wired in yet, so a successful reply only acknowledges the query.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;

use ufdr_types::chat::{ChatMessage, ChatResponse};
use ufdr_types::image::ImageInput;

use crate::http::error::AppError;
use crate::state::AppState;

/// POST /api/chat/{report_id}
pub async fn chat(
    State(state): State<AppState>,
    Path(report_id): Path<String>,
    body: Result<Json<ChatMessage>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(body) = body.map_err(|rejection| AppError::Validation(rejection.body_text()))?;

    if !body.report_id.is_empty() && body.report_id != report_id {
        return Err(AppError::Validation(format!(
            "report_id '{}' in body does not match path '{report_id}'",
            body.report_id
        )));
    }

    let message = body.message.trim();
    let image_data = body.image_data.as_deref().filter(|d| !d.trim().is_empty());
    if message.is_empty() && image_data.is_none() {
        return Err(AppError::Validation(
            "message or image_data is required".to_string(),
        ));
    }

    let mut dimension = None;
    if !message.is_empty() {
        let embedding = state.text_embedder.embed_single_text(message).await?;
        dimension = Some(embedding.dimension());
    }
    if let Some(data) = image_data {
        let input = ImageInput::from_base64(data)?;
        let embedding = state.image_embedder.embed_single_image(input).await?;
        dimension = Some(embedding.dimension());
    }
    let dimension = dimension.unwrap_or_else(|| state.text_embedder.get_embedding_dimension());

    let vector = state.stores.get_vector_store_client().await?;
    state.stores.get_graph_store_client().await?;

    tracing::info!(
        report_id = %report_id,
        has_image = image_data.is_some(),
        collection = %vector.collection().name,
        "chat query embedded"
    );

    Ok(Json(ChatResponse::success(format!(
        "Received your question about report '{report_id}'. Retrieval over collection '{}' \
         is not available yet; the query was embedded as a {dimension}-dimensional vector.",
        vector.collection().name
    ))))
}
