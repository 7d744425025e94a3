//! Export API handler.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::pipeline::{self, ExportParams};

use super::super::state::AppState;
use super::{ApiError, Upload, run_blocking};

/// POST /api/export - Render the print-ready PNG as a download.
///
/// Fields: `overlay` (image file), `params` (JSON [`ExportParams`]).
pub async fn export(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut upload = Upload::read(multipart).await?;
    let overlay = upload.take_file("overlay");
    let params: ExportParams = upload.params_or_default()?;

    let print = run_blocking(move || pipeline::export_final(&state.backgrounds, &overlay, &params)).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", print.filename),
            ),
        ],
        print.bytes,
    ))
}
