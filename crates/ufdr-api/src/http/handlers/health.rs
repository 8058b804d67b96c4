//! Liveness endpoints.

use axum::Json;
use serde_json::{json, Value};

/// GET / - Backend liveness probe used by the frontend.
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Server is running" }))
}

/// GET /health - Version and status.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
