//! # Eraser Pixel Engine
//!
//! Turns paint marks made on a scaled preview into whitened pixels of the
//! native-resolution line art.
//!
//! ```text
//! mask bytes ──decode──► EraserMask (display res)
//!                            │ nearest resample
//!                            ▼
//!                        EraserMask (canvas res) ──┐
//! PlacementRect ──corrected(native aspect)─────────┤
//!                                                  ▼
//!                          for each marked canvas pixel inside the box:
//!                          source pixel := (255, 255, 255, 255)
//! ```
//!
//! Cost is proportional to the canvas area covered by the placement box, so
//! the canvas resolution accepted here is bounded by [`EraserLimits`].

use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage, imageops::FilterType};
use tracing::debug;

use crate::error::{InkframeError, Result};
use crate::geometry::{CorrectedPlacement, PlacementRect};

/// Mask intensities strictly above this value mark a pixel for erasing.
pub const MASK_THRESHOLD: u8 = 127;

/// Largest canvas area (in pixels) the engine will scan: the full 3:4 canvas.
pub const DEFAULT_MAX_CANVAS_PIXELS: u64 = 5400 * 7200;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Resource bound on the eraser scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EraserLimits {
    pub max_canvas_pixels: u64,
}

impl Default for EraserLimits {
    fn default() -> Self {
        Self {
            max_canvas_pixels: DEFAULT_MAX_CANVAS_PIXELS,
        }
    }
}

/// Single-channel erase mask.
///
/// Intensity of a source pixel is `min(alpha, max(r, g, b))`: transparent and
/// opaque-black pixels never erase, any opaque bright stroke does.
#[derive(Debug, Clone)]
pub struct EraserMask {
    intensity: GrayImage,
}

impl EraserMask {
    pub fn from_image(image: &DynamicImage) -> Self {
        let rgba = image.to_rgba8();
        let intensity = GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            let [r, g, b, a] = rgba.get_pixel(x, y).0;
            Luma([a.min(r.max(g).max(b))])
        });
        Self { intensity }
    }

    /// Decode mask bytes as sent by the client.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(InkframeError::MissingInput("mask image"));
        }
        let image = image::load_from_memory(bytes)
            .map_err(|e| InkframeError::InvalidRequest(format!("Failed to decode mask: {}", e)))?;
        Ok(Self::from_image(&image))
    }

    pub fn width(&self) -> u32 {
        self.intensity.width()
    }

    pub fn height(&self) -> u32 {
        self.intensity.height()
    }

    /// Resample to canvas resolution with nearest-neighbor.
    pub fn resampled(self, width: u32, height: u32) -> Self {
        if self.width() == width && self.height() == height {
            return self;
        }
        debug!(
            from_width = self.width(),
            from_height = self.height(),
            width,
            height,
            "resampling eraser mask"
        );
        Self {
            intensity: image::imageops::resize(&self.intensity, width, height, FilterType::Nearest),
        }
    }

    #[inline]
    pub fn is_marked(&self, x: u32, y: u32) -> bool {
        self.intensity.get_pixel(x, y)[0] > MASK_THRESHOLD
    }

    pub fn marked_count(&self) -> usize {
        self.intensity.pixels().filter(|p| p[0] > MASK_THRESHOLD).count()
    }
}

/// Whiten every source pixel hit by a marked canvas pixel.
///
/// `mask` must already be at canvas resolution. Returns the number of source
/// pixels whose value changed, so a second run with the same mask returns 0.
pub fn apply_mask(overlay: &mut RgbaImage, mask: &EraserMask, placement: &CorrectedPlacement) -> usize {
    let (x0, y0, x1, y1) = placement.canvas_bounds(mask.width(), mask.height());
    let mut changed = 0;

    for cy in y0..y1 {
        for cx in x0..x1 {
            if !mask.is_marked(cx, cy) {
                continue;
            }
            if let Some((ox, oy)) = placement.to_source(cx, cy) {
                let px = overlay.get_pixel_mut(ox, oy);
                if *px != WHITE {
                    *px = WHITE;
                    changed += 1;
                }
            }
        }
    }
    changed
}

/// Result of an eraser run.
#[derive(Debug, Clone)]
pub struct EraseOutcome {
    pub overlay: RgbaImage,
    /// Source pixels that changed value.
    pub erased: usize,
}

/// Full eraser step: validate, resample the mask, correct the placement, whiten.
pub fn erase(
    overlay: &DynamicImage,
    mask: EraserMask,
    canvas: (u32, u32),
    rect: PlacementRect,
    limits: EraserLimits,
) -> Result<EraseOutcome> {
    let (canvas_width, canvas_height) = canvas;
    if canvas_width == 0 || canvas_height == 0 {
        return Err(InkframeError::InvalidRequest(format!(
            "canvas dimensions {}x{} must be positive",
            canvas_width, canvas_height
        )));
    }
    let area = canvas_width as u64 * canvas_height as u64;
    if area > limits.max_canvas_pixels {
        return Err(InkframeError::InvalidRequest(format!(
            "eraser canvas {}x{} exceeds the {} pixel limit",
            canvas_width, canvas_height, limits.max_canvas_pixels
        )));
    }
    if rect.height <= 0 || rect.width <= 0 {
        return Err(InkframeError::InvalidPlacement(format!(
            "placement {}x{} must have positive size",
            rect.width, rect.height
        )));
    }

    let corrected = rect.corrected(rect.height as f64, overlay.width(), overlay.height())?;
    let mask = mask.resampled(canvas_width, canvas_height);
    let mut pixels = overlay.to_rgba8();
    let erased = apply_mask(&mut pixels, &mask, &corrected);

    debug!(
        canvas_width,
        canvas_height,
        marked = mask.marked_count(),
        erased,
        "eraser applied"
    );

    Ok(EraseOutcome {
        overlay: pixels,
        erased,
    })
}
