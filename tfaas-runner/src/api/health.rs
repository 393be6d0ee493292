//! Health check endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health - Health check endpoint, with the number of loaded models.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let models = state.registry.len().await;
    (StatusCode::OK, Json(json!({ "status": "ok", "models": models })))
}
