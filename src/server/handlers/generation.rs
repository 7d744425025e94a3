//! Generation response handler.

use axum::{body::Bytes, http::header, response::IntoResponse};

use crate::pipeline;

use super::{ApiError, run_blocking};

/// POST /api/generation/extract - Pull the overlay image out of a raw
/// image-generation response body.
pub async fn extract(body: Bytes) -> Result<impl IntoResponse, ApiError> {
    let png = run_blocking(move || pipeline::overlay_from_generation(&body)).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}
