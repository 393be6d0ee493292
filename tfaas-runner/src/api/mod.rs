//! HTTP API.

pub mod classify;
pub mod health;
pub mod models;
pub mod predict;

use std::sync::Arc;

use axum::routing::get;
use axum::{middleware, Router};
use tower_http::cors::CorsLayer;

use crate::logging::request_logger;
use crate::state::AppState;

/// Build the versioned API router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(models::router())
        .merge(predict::router())
        .merge(classify::router())
}

/// Full application: `/v1` API, health check, logging and CORS.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/v1", router())
        .route("/health", get(health::health))
        .layer(middleware::from_fn(request_logger))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
