//! # Export / Bleed Finalizer
//!
//! Produces the deliverable: the full-resolution composite resized to the
//! exact print size, optionally padded with a white bleed border, and
//! encoded as PNG with the print DPI in a `pHYs` chunk.
//!
//! ```text
//! ┌───────────── target + 2·bleed ─────────────┐
//! │ white bleed                                │
//! │   ┌──────── target (resize_exact) ──────┐  │
//! │   │                                     │  │
//! │   └─────────────────────────────────────┘  │
//! └────────────────────────────────────────────┘
//! ```

use image::{Rgb, RgbImage, imageops::FilterType};
use serde::Serialize;
use tracing::debug;

use crate::error::{InkframeError, Result};
use crate::print::{BleedCode, PRINT_DPI, PrintSize};

/// Meters per inch, for the PNG `pHYs` unit.
const METERS_PER_INCH: f64 = 0.0254;

/// Target of one export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSpec {
    pub target_width: u32,
    pub target_height: u32,
    pub bleed_px: u32,
    pub dpi: u32,
}

impl ExportSpec {
    /// Look up the target size and bleed.
    ///
    /// ```
    /// use inkframe::export::ExportSpec;
    ///
    /// let spec = ExportSpec::resolve("30x40", "450px").unwrap();
    /// assert_eq!(spec.final_dimensions(), (9900, 12900));
    /// ```
    pub fn resolve(size_label: &str, bleed_code: &str) -> Result<Self> {
        let size = PrintSize::by_label(size_label)
            .ok_or_else(|| InkframeError::UnknownSize(size_label.to_string()))?;
        let bleed = BleedCode::by_code(bleed_code)
            .ok_or_else(|| InkframeError::UnknownBleedCode(bleed_code.to_string()))?;
        let (target_width, target_height) = size.target_dimensions();
        Ok(Self {
            target_width,
            target_height,
            bleed_px: bleed.pixels,
            dpi: PRINT_DPI,
        })
    }

    /// Output size including bleed on all four sides.
    pub fn final_dimensions(&self) -> (u32, u32) {
        (
            self.target_width + 2 * self.bleed_px,
            self.target_height + 2 * self.bleed_px,
        )
    }
}

/// Resize to the target and add the bleed border.
pub fn finalize(composite: &RgbImage, spec: &ExportSpec) -> RgbImage {
    let resized = if composite.dimensions() == (spec.target_width, spec.target_height) {
        composite.clone()
    } else {
        image::imageops::resize(
            composite,
            spec.target_width,
            spec.target_height,
            FilterType::Lanczos3,
        )
    };

    if spec.bleed_px == 0 {
        return resized;
    }

    let (width, height) = spec.final_dimensions();
    let mut out = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    image::imageops::replace(&mut out, &resized, spec.bleed_px as i64, spec.bleed_px as i64);
    debug!(width, height, bleed = spec.bleed_px, "bleed applied");
    out
}

/// Encode as PNG with a `pHYs` chunk carrying `dpi`.
pub fn encode_png_with_dpi(image: &RgbImage, dpi: u32) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let ppm = (dpi as f64 / METERS_PER_INCH).round() as u32;
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: ppm,
            yppu: ppm,
            unit: png::Unit::Meter,
        }));
        let mut writer = encoder
            .write_header()
            .map_err(|e| InkframeError::Encoding(format!("Failed to write PNG header: {}", e)))?;
        writer
            .write_image_data(image.as_raw())
            .map_err(|e| InkframeError::Encoding(format!("Failed to write PNG data: {}", e)))?;
        writer
            .finish()
            .map_err(|e| InkframeError::Encoding(format!("Failed to finish PNG: {}", e)))?;
    }
    Ok(bytes)
}

/// Suggested download filename: `<hint>_<size>[_bleed<px>].png`.
pub fn suggested_filename(hint: Option<&str>, size_label: &str, bleed_px: u32) -> String {
    let clean = |s: &str| -> String {
        s.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect::<String>()
            .trim_matches('_')
            .to_string()
    };
    let stem = hint.map(clean).filter(|s| !s.is_empty()).unwrap_or_else(|| "print".to_string());
    if bleed_px > 0 {
        format!("{}_{}_bleed{}.png", stem, clean(size_label), bleed_px)
    } else {
        format!("{}_{}.png", stem, clean(size_label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print::{BLEED_CODES, PRINT_SIZES};

    fn small_spec(bleed_px: u32) -> ExportSpec {
        ExportSpec {
            target_width: 30,
            target_height: 40,
            bleed_px,
            dpi: 300,
        }
    }

    #[test]
    fn test_scenario_30x40_450px() {
        let spec = ExportSpec::resolve("30x40", "450px").unwrap();
        assert_eq!((spec.target_width, spec.target_height), (9000, 12000));
        assert_eq!(spec.final_dimensions(), (9900, 12900));
    }

    #[test]
    fn test_final_dimensions_for_every_size_and_bleed() {
        for size in PRINT_SIZES {
            for bleed in BLEED_CODES {
                let spec = ExportSpec::resolve(size.label, bleed.code).unwrap();
                let (tw, th) = size.target_dimensions();
                assert_eq!(spec.final_dimensions(), (tw + 2 * bleed.pixels, th + 2 * bleed.pixels));
            }
        }
    }

    #[test]
    fn test_unknown_codes() {
        assert_eq!(ExportSpec::resolve("1x1", "none").unwrap_err().code(), "UNKNOWN_SIZE");
        assert_eq!(
            ExportSpec::resolve("18x24", "7px").unwrap_err().code(),
            "UNKNOWN_BLEED_CODE"
        );
    }

    #[test]
    fn test_finalize_without_bleed_is_exact_target() {
        let composite = RgbImage::from_pixel(54, 72, Rgb([10, 10, 10]));
        let out = finalize(&composite, &small_spec(0));
        assert_eq!(out.dimensions(), (30, 40));
    }

    #[test]
    fn test_finalize_with_bleed_pads_white() {
        let composite = RgbImage::from_pixel(54, 72, Rgb([10, 10, 10]));
        let out = finalize(&composite, &small_spec(5));
        assert_eq!(out.dimensions(), (40, 50));
        assert_eq!(*out.get_pixel(0, 0), Rgb([255, 255, 255]));
        assert_eq!(*out.get_pixel(4, 25), Rgb([255, 255, 255]));
        assert_eq!(*out.get_pixel(39, 49), Rgb([255, 255, 255]));
        assert_eq!(*out.get_pixel(20, 25), Rgb([10, 10, 10]));
    }

    #[test]
    fn test_finalize_is_non_aspect_preserving() {
        let composite = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
        let out = finalize(&composite, &small_spec(0));
        assert_eq!(out.dimensions(), (30, 40));
    }

    #[test]
    fn test_png_carries_dpi() {
        let img = RgbImage::from_pixel(3, 2, Rgb([1, 2, 3]));
        let bytes = encode_png_with_dpi(&img, 300).unwrap();
        let decoder = png::Decoder::new(bytes.as_slice());
        let reader = decoder.read_info().unwrap();
        let dims = reader.info().pixel_dims.unwrap();
        assert_eq!(dims.unit, png::Unit::Meter);
        assert_eq!(dims.xppu, 11811);
        assert_eq!(dims.yppu, 11811);
        assert_eq!((reader.info().width, reader.info().height), (3, 2));
    }

    #[test]
    fn test_suggested_filename() {
        assert_eq!(suggested_filename(Some("Ada's Birthday"), "18x24", 0), "Ada_s_Birthday_18x24.png");
        assert_eq!(suggested_filename(None, "30x40", 450), "print_30x40_bleed450.png");
        assert_eq!(suggested_filename(Some("../.."), "4x6", 0), "print_4x6.png");
    }
}
