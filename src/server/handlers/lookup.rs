//! Lookup-table handlers.

use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use crate::geometry::CanvasSpec;
use crate::print::{BLEED_CODES, DEFAULT_SIZE_LABEL, PRINT_SIZES};
use crate::render::background::BackgroundSelector;

use super::super::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeInfo {
    pub label: &'static str,
    pub aspect_class: &'static str,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub target_width: u32,
    pub target_height: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BleedInfo {
    pub code: &'static str,
    pub pixels: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizesResponse {
    pub default_size: &'static str,
    pub sizes: Vec<SizeInfo>,
    pub bleed_codes: Vec<BleedInfo>,
}

#[derive(Debug, Serialize)]
pub struct BackgroundInfo {
    pub selector: &'static str,
    pub loaded: bool,
}

/// GET /api/sizes - Print sizes and bleed codes.
pub async fn sizes() -> Json<SizesResponse> {
    let sizes = PRINT_SIZES
        .iter()
        .map(|size| {
            let canvas = CanvasSpec::for_class(size.aspect);
            let (target_width, target_height) = size.target_dimensions();
            SizeInfo {
                label: size.label,
                aspect_class: size.aspect.name(),
                canvas_width: canvas.width,
                canvas_height: canvas.height,
                target_width,
                target_height,
            }
        })
        .collect();
    let bleed_codes = BLEED_CODES
        .iter()
        .map(|b| BleedInfo {
            code: b.code,
            pixels: b.pixels,
        })
        .collect();

    Json(SizesResponse {
        default_size: DEFAULT_SIZE_LABEL,
        sizes,
        bleed_codes,
    })
}

/// GET /api/backgrounds - Background selectors and whether each has an asset.
pub async fn backgrounds(State(state): State<Arc<AppState>>) -> Json<Vec<BackgroundInfo>> {
    Json(
        BackgroundSelector::all()
            .iter()
            .map(|&selector| BackgroundInfo {
                selector: selector.name(),
                loaded: state.backgrounds.contains(selector),
            })
            .collect(),
    )
}
