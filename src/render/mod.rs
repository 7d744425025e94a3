//! # Rendering Module
//!
//! Layer compositing for prints: background, multiplied line-art overlay and
//! text layers.
//!
//! ## Modules
//!
//! - [`background`]: Background selectors and the asset store
//! - [`blend`]: Normal and multiply blending on RGBA layers
//! - [`color`]: Hex colors for text styles
//! - [`compositor`]: The layer compositor (full / preview)
//! - [`text`]: Font registration and text-layer rasterization
//!
//! ## Usage Example
//!
//! ```no_run
//! use inkframe::geometry::{CanvasSpec, PlacementConfig};
//! use inkframe::render::compositor::{Composition, RenderMode};
//!
//! let canvas = CanvasSpec::resolve("18x24")?;
//! let background = image::open("assets/white.png").unwrap();
//! let overlay = image::open("lineart.png").unwrap();
//!
//! let composited = Composition {
//!     canvas,
//!     background: &background,
//!     overlay: &overlay,
//!     placement: PlacementConfig::centered(&canvas),
//!     text_layers: &[],
//! }
//! .render(RenderMode::Preview)?;
//!
//! let png = inkframe::render::encode_png(&composited.image)?;
//! # Ok::<(), inkframe::InkframeError>(())
//! ```

pub mod background;
pub mod blend;
pub mod color;
pub mod compositor;
pub mod text;

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};

use crate::error::{InkframeError, Result};

/// Encode an opaque raster as PNG.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| InkframeError::Encoding(format!("Failed to encode PNG: {}", e)))?;
    Ok(bytes)
}

/// Encode an RGBA raster as PNG.
pub fn encode_png_rgba(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| InkframeError::Encoding(format!("Failed to encode PNG: {}", e)))?;
    Ok(bytes)
}

/// Decode uploaded overlay bytes.
pub fn decode_overlay(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(InkframeError::MissingInput("overlay image"));
    }
    let img = image::load_from_memory(bytes)
        .map_err(|e| InkframeError::InvalidOverlay(format!("Failed to decode image: {}", e)))?;
    if img.width() == 0 || img.height() == 0 {
        return Err(InkframeError::InvalidOverlay(format!(
            "overlay has degenerate dimensions {}x{}",
            img.width(),
            img.height()
        )));
    }
    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_png_roundtrip_dimensions() {
        let img = RgbImage::from_pixel(7, 5, Rgb([1, 2, 3]));
        let bytes = encode_png(&img).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        let decoded = decode_overlay(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (7, 5));
    }

    #[test]
    fn test_decode_empty_is_missing_input() {
        assert_eq!(decode_overlay(&[]).unwrap_err().code(), "MISSING_INPUT");
    }

    #[test]
    fn test_decode_garbage_is_invalid_overlay() {
        assert_eq!(
            decode_overlay(b"definitely not an image").unwrap_err().code(),
            "INVALID_OVERLAY"
        );
    }
}
