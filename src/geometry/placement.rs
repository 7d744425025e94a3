//! Placement and coordinate mapping.
//!
//! The client describes the overlay by its center and rendered height only;
//! the width follows from the declared 3:4 aspect. Three derived shapes live
//! here:
//!
//! ```text
//! PlacementConfig ──► PlacementRect ──► ClipRect            (compositing)
//!                          │
//!                          └──────────► CorrectedPlacement  (eraser)
//! ```
//!
//! The corrected placement re-centers the box on the overlay's true native
//! aspect so that erase strokes land on the pixels the user actually saw.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{CanvasSpec, round_half_away};
use crate::error::{InkframeError, Result};

/// Aspect ratio (width / height) the client assumes for every overlay.
pub const DECLARED_ASPECT: f64 = 3.0 / 4.0;

/// Largest magnitude accepted for any placement coordinate, in canvas pixels.
pub const MAX_PLACEMENT_EXTENT: f64 = 1.0e9;

/// Native aspects further than this (relative) from the declared one get a warning.
const ASPECT_DIVERGENCE_WARN: f64 = 0.10;

/// Center + height placement of the overlay, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementConfig {
    pub center_x: f64,
    pub center_y: f64,
    pub scale_height: f64,
}

impl PlacementConfig {
    /// Overlay centered on the canvas at full canvas height.
    pub fn centered(canvas: &CanvasSpec) -> Self {
        Self {
            center_x: canvas.width as f64 / 2.0,
            center_y: canvas.height as f64 / 2.0,
            scale_height: canvas.height as f64,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.center_x.is_finite() || !self.center_y.is_finite() {
            return Err(InkframeError::InvalidPlacement(format!(
                "center must be finite, got ({}, {})",
                self.center_x, self.center_y
            )));
        }
        if !self.scale_height.is_finite() || self.scale_height <= 0.0 {
            return Err(InkframeError::InvalidPlacement(format!(
                "scaleHeight must be positive, got {}",
                self.scale_height
            )));
        }
        let extent = self.center_x.abs().max(self.center_y.abs()).max(self.scale_height);
        if extent > MAX_PLACEMENT_EXTENT {
            return Err(InkframeError::InvalidPlacement(format!(
                "placement values must be within {} pixels, got {}",
                MAX_PLACEMENT_EXTENT, extent
            )));
        }
        Ok(())
    }

    /// Uniformly scale every spatial quantity.
    pub fn scaled(&self, scale: f64) -> Self {
        Self {
            center_x: self.center_x * scale,
            center_y: self.center_y * scale,
            scale_height: self.scale_height * scale,
        }
    }

    /// Placement rectangle in canvas space.
    pub fn rect(&self) -> Result<PlacementRect> {
        PlacementRect::from_config(self)
    }
}

/// Overlay box in canvas space, using the declared aspect.
///
/// May extend past any canvas edge; see [`PlacementRect::clip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementRect {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

/// The visible part of a placed overlay.
///
/// `crop_*` index into the overlay resized to its placement box;
/// `paste_*` index into the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipRect {
    pub crop_left: u32,
    pub crop_top: u32,
    pub crop_width: u32,
    pub crop_height: u32,
    pub paste_left: u32,
    pub paste_top: u32,
}

impl PlacementRect {
    /// Derive the placement box from a center + height config.
    ///
    /// ```
    /// use inkframe::geometry::{PlacementConfig, PlacementRect};
    ///
    /// let cfg = PlacementConfig { center_x: 2700.0, center_y: 3200.0, scale_height: 7200.0 };
    /// let rect = PlacementRect::from_config(&cfg).unwrap();
    /// assert_eq!((rect.left, rect.top, rect.width, rect.height), (0, -400, 5400, 7200));
    /// ```
    pub fn from_config(cfg: &PlacementConfig) -> Result<Self> {
        cfg.validate()?;
        let width = round_half_away(cfg.scale_height * DECLARED_ASPECT);
        let height = round_half_away(cfg.scale_height);
        let top = round_half_away(cfg.center_y - height as f64 / 2.0);
        let left = round_half_away(cfg.center_x - width as f64 / 2.0);
        Ok(Self {
            left,
            top,
            width,
            height,
        })
    }

    /// Visible sub-rectangle inside a `canvas_width x canvas_height` canvas.
    ///
    /// Returns `None` when nothing of the overlay is visible; the caller
    /// treats that as an empty layer.
    pub fn clip(&self, canvas_width: u32, canvas_height: u32) -> Option<ClipRect> {
        let crop_left = (-self.left).max(0);
        let crop_top = (-self.top).max(0);
        let paste_left = self.left.max(0);
        let paste_top = self.top.max(0);
        let crop_width = (self.width - crop_left).min(canvas_width as i64 - paste_left);
        let crop_height = (self.height - crop_top).min(canvas_height as i64 - paste_top);

        if crop_width <= 0 || crop_height <= 0 {
            return None;
        }

        Some(ClipRect {
            crop_left: crop_left as u32,
            crop_top: crop_top as u32,
            crop_width: crop_width as u32,
            crop_height: crop_height as u32,
            paste_left: paste_left as u32,
            paste_top: paste_top as u32,
        })
    }

    /// Re-center the box on the overlay's native aspect ratio.
    ///
    /// `scale_height` is the unrounded height the rectangle was derived from
    /// (or the rectangle height itself when only the rectangle is known).
    pub fn corrected(
        &self,
        scale_height: f64,
        native_width: u32,
        native_height: u32,
    ) -> Result<CorrectedPlacement> {
        if native_width == 0 || native_height == 0 {
            return Err(InkframeError::InvalidOverlay(format!(
                "native dimensions {}x{} are degenerate",
                native_width, native_height
            )));
        }
        if !scale_height.is_finite() || scale_height <= 0.0 {
            return Err(InkframeError::InvalidPlacement(format!(
                "scaleHeight must be positive, got {}",
                scale_height
            )));
        }

        let native_aspect = native_width as f64 / native_height as f64;
        if (native_aspect / DECLARED_ASPECT - 1.0).abs() > ASPECT_DIVERGENCE_WARN {
            warn!(
                native_width,
                native_height,
                "overlay aspect diverges from declared 3:4; eraser correction is approximate"
            );
        }

        let true_width = scale_height * native_aspect;
        let width_delta = self.width as f64 - true_width;

        Ok(CorrectedPlacement {
            left: self.left as f64 + width_delta / 2.0,
            top: self.top as f64,
            width: true_width,
            height: self.height as f64,
            native_width,
            native_height,
        })
    }
}

/// Placement box re-centered on the overlay's native aspect ratio.
///
/// Authoritative for mapping canvas pixels back to source pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectedPlacement {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub native_width: u32,
    pub native_height: u32,
}

impl CorrectedPlacement {
    #[inline]
    pub fn contains(&self, cx: f64, cy: f64) -> bool {
        cx >= self.left && cx < self.left + self.width && cy >= self.top && cy < self.top + self.height
    }

    /// Map a canvas pixel to a source pixel of the native overlay.
    ///
    /// `None` for pixels outside the box or rounding past the native bounds.
    pub fn to_source(&self, cx: u32, cy: u32) -> Option<(u32, u32)> {
        let (fx, fy) = (cx as f64, cy as f64);
        if !self.contains(fx, fy) {
            return None;
        }
        let ox = round_half_away((fx - self.left) * self.native_width as f64 / self.width);
        let oy = round_half_away((fy - self.top) * self.native_height as f64 / self.height);
        if ox < 0 || oy < 0 || ox >= self.native_width as i64 || oy >= self.native_height as i64 {
            return None;
        }
        Some((ox as u32, oy as u32))
    }

    /// Integer canvas bounds covering the box, clamped to the canvas.
    ///
    /// Returns `(x0, y0, x1, y1)` with exclusive upper bounds.
    pub fn canvas_bounds(&self, canvas_width: u32, canvas_height: u32) -> (u32, u32, u32, u32) {
        let clamp = |v: f64, max: u32| v.max(0.0).min(max as f64) as u32;
        (
            clamp(self.left.floor(), canvas_width),
            clamp(self.top.floor(), canvas_height),
            clamp((self.left + self.width).ceil(), canvas_width),
            clamp((self.top + self.height).ceil(), canvas_height),
        )
    }
}
