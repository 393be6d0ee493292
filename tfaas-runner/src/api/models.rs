//! Models endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tfaas_common::ModelDescriptor;

use crate::state::AppState;

/// Build the models router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/models", get(list_models))
}

#[derive(Debug, Serialize)]
struct ModelsResponse {
    object: &'static str,
    data: Vec<ModelDescriptor>,
}

/// GET /v1/models - Descriptors of all loaded models.
async fn list_models(State(state): State<Arc<AppState>>) -> Json<ModelsResponse> {
    let data = state
        .registry
        .cached()
        .await
        .iter()
        .map(|model| model.descriptor().clone())
        .collect();

    Json(ModelsResponse {
        object: "list",
        data,
    })
}
