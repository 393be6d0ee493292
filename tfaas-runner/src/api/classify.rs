//! Image classification endpoint.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use tfaas_common::ClassifyResult;

use crate::error::{Error, Result};
use crate::graph::ImageFormat;
use crate::service::ImageUpload;
use crate::state::AppState;

/// Largest accepted upload.
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Build the classify router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/classify", post(classify))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// POST /v1/classify - Classify an uploaded image.
///
/// Multipart fields: `image` (file), `model`, and optionally `format`
/// (`png`/`jpeg`, otherwise taken from the file name) and `top_n`.
async fn classify(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ClassifyResult>> {
    let upload = read_upload(multipart).await?;
    let result = state.classifier.classify_image(upload).await?;
    Ok(Json(result))
}

async fn read_upload(mut multipart: Multipart) -> Result<ImageUpload> {
    let mut image: Option<(String, Vec<u8>)> = None;
    let mut model = None;
    let mut format = None;
    let mut top_n = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let filename = field.file_name().unwrap_or("image").to_string();
                let bytes = field.bytes().await.map_err(invalid)?;
                image = Some((filename, bytes.to_vec()));
            }
            "model" => model = Some(field.text().await.map_err(invalid)?),
            "format" => format = Some(field.text().await.map_err(invalid)?),
            "top_n" => top_n = Some(parse_top_n(&field.text().await.map_err(invalid)?)?),
            other => tracing::debug!(field = %other, "Ignoring multipart field"),
        }
    }

    let (filename, bytes) =
        image.ok_or_else(|| Error::InvalidRequest("missing image field".to_string()))?;
    let format = match format {
        Some(format) => format.parse::<ImageFormat>()?,
        None => ImageFormat::from_filename(&filename)?,
    };

    Ok(ImageUpload {
        filename,
        bytes,
        format,
        model,
        top_n,
    })
}

fn parse_top_n(text: &str) -> Result<usize> {
    match text.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::InvalidRequest(format!(
            "top_n must be a positive integer, got {:?}",
            text
        ))),
    }
}

fn invalid(err: axum::extract::multipart::MultipartError) -> Error {
    Error::InvalidRequest(err.to_string())
}
