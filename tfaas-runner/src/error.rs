//! Error types for the runner.

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Error types for model loading and inference.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed descriptor {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed graph {}: {reason}", path.display())]
    Graph { path: PathBuf, reason: String },

    #[error("Failed to load model {model}: {source}")]
    Load {
        model: String,
        #[source]
        source: Arc<Error>,
    },

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Image decoding failed: {0}")]
    Decode(String),

    #[error("Requested top {requested} labels but only {available} are available")]
    Bounds { requested: usize, available: usize },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Wrap a storage or parse failure as a load failure for `model`.
    ///
    /// The source is shared so every caller waiting on one load can report it.
    pub fn load(model: impl Into<String>, source: impl Into<Arc<Error>>) -> Self {
        Error::Load {
            model: model.into(),
            source: source.into(),
        }
    }

    fn status(&self) -> (StatusCode, &'static str) {
        match self {
            Error::ModelNotFound(_) => (StatusCode::NOT_FOUND, "model_not_found"),
            Error::Storage { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            Error::Parse { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "parse_error"),
            Error::Graph { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "graph_error"),
            Error::Load { source, .. } => match source.as_ref() {
                Error::ModelNotFound(_) => (StatusCode::NOT_FOUND, "model_not_found"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "load_failed"),
            },
            Error::Execution(_) => (StatusCode::INTERNAL_SERVER_ERROR, "execution_failed"),
            Error::UnsupportedFormat(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported_format")
            }
            Error::Decode(_) => (StatusCode::UNPROCESSABLE_ENTITY, "decode_failed"),
            Error::Bounds { .. } => (StatusCode::BAD_REQUEST, "bounds_error"),
            Error::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            Error::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl From<tract_core::prelude::TractError> for Error {
    fn from(err: tract_core::prelude::TractError) -> Self {
        Error::Execution(format!("{:#}", err))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status();

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.to_string()
            }
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
