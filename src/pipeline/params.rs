//! Request parameters for the three pipeline operations.
//!
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::geometry::{PlacementConfig, PlacementRect};
use crate::print::DEFAULT_SIZE_LABEL;
use crate::render::background::BackgroundSelector;
use crate::render::text::TextStyles;

fn default_size() -> String {
    DEFAULT_SIZE_LABEL.to_string()
}

fn default_bleed() -> String {
    "none".to_string()
}

/// Layer inputs shared by Composite and ExportFinal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerParams {
    /// Omitted → overlay centered at full canvas height.
    #[serde(default, alias = "placement")]
    pub placement_config: Option<PlacementConfig>,
    #[serde(default)]
    pub title_text: String,
    #[serde(default)]
    pub date_text: String,
    #[serde(default)]
    pub text_style: TextStyles,
    #[serde(default, alias = "background")]
    pub background_selector: BackgroundSelector,
    #[serde(default = "default_size", alias = "size")]
    pub size_label: String,
}

impl Default for LayerParams {
    fn default() -> Self {
        Self {
            placement_config: None,
            title_text: String::new(),
            date_text: String::new(),
            text_style: TextStyles::default(),
            background_selector: BackgroundSelector::default(),
            size_label: default_size(),
        }
    }
}

/// Composite request parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeParams {
    #[serde(flatten)]
    pub layers: LayerParams,
    #[serde(default, alias = "preview")]
    pub preview_flag: bool,
}

/// ApplyEraser request parameters: the canvas the mask is expressed in and
/// the placement rectangle the user saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EraserParams {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub placement_top: i64,
    pub placement_left: i64,
    pub placement_width: i64,
    pub placement_height: i64,
}

impl EraserParams {
    pub fn rect(&self) -> PlacementRect {
        PlacementRect {
            left: self.placement_left,
            top: self.placement_top,
            width: self.placement_width,
            height: self.placement_height,
        }
    }
}

/// ExportFinal request parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportParams {
    #[serde(flatten)]
    pub layers: LayerParams,
    #[serde(default = "default_bleed", alias = "bleed")]
    pub bleed_code: String,
    #[serde(default, alias = "filename")]
    pub filename_hint: Option<String>,
}

impl Default for ExportParams {
    fn default() -> Self {
        Self {
            layers: LayerParams::default(),
            bleed_code: default_bleed(),
            filename_hint: None,
        }
    }
}
