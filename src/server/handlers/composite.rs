//! Composite API handler.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::pipeline::{self, CompositeParams};

use super::super::state::AppState;
use super::{ApiError, Upload, run_blocking};

/// POST /api/composite - Render the layered print as PNG.
///
/// Fields: `overlay` (image file), `params` (JSON [`CompositeParams`]).
pub async fn composite(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut upload = Upload::read(multipart).await?;
    let overlay = upload.take_file("overlay");
    let params: CompositeParams = upload.params_or_default()?;

    let png = run_blocking(move || pipeline::composite(&state.backgrounds, &overlay, &params)).await?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}
