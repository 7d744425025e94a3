//! Eraser API handler.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::pipeline::{self, EraserParams};

use super::super::state::AppState;
use super::{ApiError, Upload, run_blocking};

/// Header reporting how many overlay pixels were whitened.
pub const ERASED_PIXELS_HEADER: &str = "x-erased-pixels";

/// POST /api/eraser - Whiten overlay pixels under the painted mask.
///
/// Fields: `overlay`, `mask` (image files), `params` (JSON [`EraserParams`]).
/// An unchanged overlay comes back byte-for-byte with its original type.
pub async fn apply(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut upload = Upload::read(multipart).await?;
    let overlay = upload.take_file("overlay");
    let mask = upload.take_file("mask");
    let params: EraserParams = upload.params()?;
    let limits = state.config.eraser_limits;

    let erased = run_blocking(move || pipeline::apply_eraser(overlay, &mask, &params, limits)).await?;

    Ok((
        [
            (header::CONTENT_TYPE.as_str(), erased.content_type().to_string()),
            (ERASED_PIXELS_HEADER, erased.changed_pixels.to_string()),
        ],
        erased.bytes,
    ))
}
