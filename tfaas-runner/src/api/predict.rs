//! Feature-row prediction endpoint.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tfaas_common::{ClassifyResult, Row};

use crate::error::{Error, Result};
use crate::state::AppState;

/// Build the predict router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/predict", post(predict))
}

/// POST /v1/predict - Classify a row of feature values.
async fn predict(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<Row>, JsonRejection>,
) -> Result<Json<ClassifyResult>> {
    let Json(row) = payload.map_err(|e| Error::InvalidRequest(e.body_text()))?;
    let result = state.classifier.classify_row(row).await?;
    Ok(Json(result))
}
