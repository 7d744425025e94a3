//! # Canvas Geometry
//!
//! Resolves print-size labels into logical canvas sizes and maps overlay
//! placements into canvas space.
//!
//! All rounding in this module goes through [`round_half_away`], so the same
//! inputs always land on the same pixel.

pub mod placement;

pub use placement::{
    ClipRect, CorrectedPlacement, DECLARED_ASPECT, MAX_PLACEMENT_EXTENT, PlacementConfig, PlacementRect,
};

use serde::Serialize;
use tracing::warn;

use crate::error::{InkframeError, Result};
use crate::print::{AspectClass, PrintSize, DEFAULT_SIZE_LABEL};

/// Round half away from zero, the single rounding rule for coordinate math.
///
/// `f64::round` already rounds ties away from zero; this wrapper exists so
/// every call site names the rule explicitly.
#[inline]
pub fn round_half_away(v: f64) -> i64 {
    v.round() as i64
}

/// Logical canvas on which all layers are composited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasSpec {
    pub width: u32,
    pub height: u32,
    pub aspect_class: AspectClass,
}

impl CanvasSpec {
    /// Canvas for an aspect class.
    pub fn for_class(aspect_class: AspectClass) -> Self {
        let (width, height) = aspect_class.canvas_dimensions();
        Self {
            width,
            height,
            aspect_class,
        }
    }

    /// Resolve a print-size label into its canvas.
    ///
    /// ```
    /// use inkframe::geometry::CanvasSpec;
    ///
    /// let canvas = CanvasSpec::resolve("18x24").unwrap();
    /// assert_eq!((canvas.width, canvas.height), (5400, 7200));
    /// ```
    pub fn resolve(label: &str) -> Result<Self> {
        PrintSize::by_label(label)
            .map(|size| Self::for_class(size.aspect))
            .ok_or_else(|| InkframeError::UnknownSize(label.to_string()))
    }

    /// Resolve a label, falling back to the documented default size.
    pub fn resolve_or_default(label: &str) -> Self {
        match Self::resolve(label) {
            Ok(spec) => spec,
            Err(_) => {
                warn!(label, fallback = DEFAULT_SIZE_LABEL, "unknown print size, using default");
                let size = PrintSize::by_label(DEFAULT_SIZE_LABEL)
                    .map(|s| s.aspect)
                    .unwrap_or(AspectClass::ThreeFour);
                Self::for_class(size)
            }
        }
    }

    /// Canvas size at a render scale (preview is 0.5).
    pub fn scaled_dimensions(&self, scale: f64) -> (u32, u32) {
        let w = round_half_away(self.width as f64 * scale).max(1) as u32;
        let h = round_half_away(self.height as f64 * scale).max(1) as u32;
        (w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print::PRINT_SIZES;

    #[test]
    fn test_resolve_18x24() {
        let canvas = CanvasSpec::resolve("18x24").unwrap();
        assert_eq!(canvas.width, 5400);
        assert_eq!(canvas.height, 7200);
        assert_eq!(canvas.aspect_class, AspectClass::ThreeFour);
    }

    #[test]
    fn test_resolve_two_three() {
        let canvas = CanvasSpec::resolve("24x36").unwrap();
        assert_eq!((canvas.width, canvas.height), (4800, 7200));
    }

    #[test]
    fn test_resolve_unknown() {
        let err = CanvasSpec::resolve("11x17").unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_SIZE");
    }

    #[test]
    fn test_resolve_or_default() {
        let canvas = CanvasSpec::resolve_or_default("nonsense");
        assert_eq!(canvas, CanvasSpec::resolve(DEFAULT_SIZE_LABEL).unwrap());
    }

    #[test]
    fn test_resolve_is_pure() {
        for size in PRINT_SIZES {
            assert_eq!(
                CanvasSpec::resolve(size.label).unwrap(),
                CanvasSpec::resolve(size.label).unwrap()
            );
        }
    }

    #[test]
    fn test_scaled_dimensions() {
        let canvas = CanvasSpec::resolve("18x24").unwrap();
        assert_eq!(canvas.scaled_dimensions(1.0), (5400, 7200));
        assert_eq!(canvas.scaled_dimensions(0.5), (2700, 3600));
        let canvas = CanvasSpec::resolve("4x6").unwrap();
        assert_eq!(canvas.scaled_dimensions(0.5), (2400, 3600));
    }

    #[test]
    fn test_round_half_away() {
        assert_eq!(round_half_away(2.5), 3);
        assert_eq!(round_half_away(-2.5), -3);
        assert_eq!(round_half_away(-0.4), 0);
        assert_eq!(round_half_away(1.49), 1);
    }
}
