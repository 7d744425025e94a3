//! Layer compositor.
//!
//! Stacks the layers of one print onto a single opaque raster:
//!
//! ```text
//! background (opaque, resized to fill)
//!   └─ overlay, letterboxed into its placement box, clipped, MULTIPLY
//!        └─ text layers in declared order (title, date), NORMAL
//! ```
//!
//! Preview mode runs the identical algorithm with every spatial quantity
//! (canvas size, placement, text metrics) scaled by [`PREVIEW_SCALE`].

use std::time::Instant;

use image::{DynamicImage, GenericImageView, RgbImage, Rgba, RgbaImage, imageops::FilterType};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::blend::{BlendMode, Region, blend_at, blend_region};
use super::text::{self, TextLayer, TextRaster};
use crate::error::{InkframeError, Result};
use crate::geometry::{CanvasSpec, ClipRect, PlacementConfig, PlacementRect, round_half_away};

/// Scale factor applied by preview mode.
pub const PREVIEW_SCALE: f64 = 0.5;

/// Resolution mode of a compositor run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Full canvas resolution, used for export.
    #[default]
    Full,
    /// Uniformly downscaled, used while editing.
    Preview,
}

impl RenderMode {
    pub fn from_preview_flag(preview: bool) -> Self {
        if preview {
            RenderMode::Preview
        } else {
            RenderMode::Full
        }
    }

    pub fn scale(self) -> f64 {
        match self {
            RenderMode::Full => 1.0,
            RenderMode::Preview => PREVIEW_SCALE,
        }
    }

    /// Triangle for speed in preview, Lanczos3 for print quality.
    pub fn filter(self) -> FilterType {
        match self {
            RenderMode::Full => FilterType::Lanczos3,
            RenderMode::Preview => FilterType::Triangle,
        }
    }
}

/// Everything one compositor run needs, at full canvas resolution.
#[derive(Debug, Clone, Copy)]
pub struct Composition<'a> {
    pub canvas: CanvasSpec,
    pub background: &'a DynamicImage,
    pub overlay: &'a DynamicImage,
    pub placement: PlacementConfig,
    /// Layers in stacking order.
    pub text_layers: &'a [TextLayer],
}

/// Where each layer ended up, in the coordinates of the rendered raster.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerLayout {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub overlay: PlacementRect,
    /// `None` when the overlay lies entirely outside the canvas.
    pub overlay_clip: Option<ClipRect>,
    /// One entry per rendered text layer: (left, top, width, height).
    pub text: Vec<(i64, i64, u32, u32)>,
}

/// Compositor output.
#[derive(Debug, Clone)]
pub struct Composited {
    pub image: RgbImage,
    pub layout: LayerLayout,
}

impl Composition<'_> {
    /// Render in full or preview mode.
    pub fn render(&self, mode: RenderMode) -> Result<Composited> {
        self.render_at_scale(mode.scale(), mode.filter())
    }

    /// Render with an arbitrary uniform scale.
    pub fn render_at_scale(&self, scale: f64, filter: FilterType) -> Result<Composited> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(InkframeError::InvalidRequest(format!(
                "render scale must be positive, got {}",
                scale
            )));
        }
        if self.overlay.width() == 0 || self.overlay.height() == 0 {
            return Err(InkframeError::InvalidOverlay(format!(
                "overlay has degenerate dimensions {}x{}",
                self.overlay.width(),
                self.overlay.height()
            )));
        }

        let started = Instant::now();
        let (width, height) = self.canvas.scaled_dimensions(scale);
        let placement = self.placement.scaled(scale);
        let rect = placement.rect()?;

        // 1. Background
        let mut canvas = if self.background.width() == width && self.background.height() == height {
            self.background.to_rgb8()
        } else {
            self.background.resize_exact(width, height, filter).to_rgb8()
        };

        // 2. Overlay
        let clip = rect.clip(width, height);
        if let Some(clip) = clip {
            let window = letterbox_window(self.overlay, &rect, &clip, filter);
            blend_region(
                &mut canvas,
                &window,
                Region {
                    src_origin: (0, 0),
                    dst_origin: (clip.paste_left, clip.paste_top),
                    size: (clip.crop_width, clip.crop_height),
                },
                BlendMode::Multiply,
            );
        } else {
            debug!(?rect, "overlay outside canvas, using empty layer");
        }

        // 3. Text, rasterized in parallel and blended in declared order
        let visible: Vec<TextLayer> = self
            .text_layers
            .iter()
            .filter(|l| l.is_visible())
            .map(|l| TextLayer::new(l.style.scaled(scale), l.text.clone()))
            .collect();
        let rasters: Vec<TextRaster> = if visible.is_empty() {
            Vec::new()
        } else {
            let font = text::font()?;
            let rendered: Vec<Option<TextRaster>> = visible
                .par_iter()
                .map(|layer| text::render_text_layer(font, layer, (width, height)))
                .collect::<Result<_>>()?;
            rendered.into_iter().flatten().collect()
        };
        for raster in &rasters {
            blend_at(&mut canvas, &raster.image, raster.left, raster.top, BlendMode::Normal);
        }

        debug!(
            width,
            height,
            scale,
            text_layers = rasters.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "composited"
        );

        Ok(Composited {
            image: canvas,
            layout: LayerLayout {
                canvas_width: width,
                canvas_height: height,
                overlay: rect,
                overlay_clip: clip,
                text: rasters
                    .iter()
                    .map(|r| (r.left, r.top, r.image.width(), r.image.height()))
                    .collect(),
            },
        })
    }
}

/// Above this many pixels an upscaled overlay is sampled per visible pixel
/// instead of being resized as a whole.
pub const MAX_FITTED_PIXELS: u64 = 64 * 1024 * 1024;

/// The part of the letterboxed overlay visible through `clip`.
///
/// The overlay is fit inside the placement box, centered, with transparent
/// padding on the short axis. Only the `crop_width x crop_height` window is
/// materialized, so memory follows the visible area rather than the box.
pub fn letterbox_window(
    overlay: &DynamicImage,
    rect: &PlacementRect,
    clip: &ClipRect,
    filter: FilterType,
) -> RgbaImage {
    let mut out = RgbaImage::new(clip.crop_width, clip.crop_height);
    let (ow, oh) = overlay.dimensions();
    if rect.width <= 0 || rect.height <= 0 || ow == 0 || oh == 0 {
        return out;
    }

    let fit = (rect.width as f64 / ow as f64).min(rect.height as f64 / oh as f64);
    let fitted_w = round_half_away(ow as f64 * fit).clamp(1, rect.width);
    let fitted_h = round_half_away(oh as f64 * fit).clamp(1, rect.height);
    let off_x = (rect.width - fitted_w) / 2;
    let off_y = (rect.height - fitted_h) / 2;

    // Fitted image ∩ crop window, in box coordinates
    let crop_x = clip.crop_left as i64;
    let crop_y = clip.crop_top as i64;
    let x0 = crop_x.max(off_x);
    let y0 = crop_y.max(off_y);
    let x1 = (crop_x + clip.crop_width as i64).min(off_x + fitted_w);
    let y1 = (crop_y + clip.crop_height as i64).min(off_y + fitted_h);
    if x0 >= x1 || y0 >= y1 {
        return out;
    }

    let fitted_pixels = fitted_w as u64 * fitted_h as u64;
    if fit > 1.0 && fitted_pixels > MAX_FITTED_PIXELS {
        debug!(fitted_w, fitted_h, "sampling visible overlay window");
        let source = overlay.to_rgba8();
        let sx = ow as f64 / fitted_w as f64;
        let sy = oh as f64 / fitted_h as f64;
        for y in y0..y1 {
            let v = ((y - off_y) as f64 + 0.5) * sy - 0.5;
            for x in x0..x1 {
                let u = ((x - off_x) as f64 + 0.5) * sx - 0.5;
                out.put_pixel((x - crop_x) as u32, (y - crop_y) as u32, sample_bilinear(&source, u, v));
            }
        }
        return out;
    }

    let fitted = if (ow as i64, oh as i64) == (fitted_w, fitted_h) {
        overlay.to_rgba8()
    } else {
        overlay.resize_exact(fitted_w as u32, fitted_h as u32, filter).to_rgba8()
    };
    let visible = image::imageops::crop_imm(
        &fitted,
        (x0 - off_x) as u32,
        (y0 - off_y) as u32,
        (x1 - x0) as u32,
        (y1 - y0) as u32,
    )
    .to_image();
    image::imageops::replace(&mut out, &visible, x0 - crop_x, y0 - crop_y);
    out
}

/// Bilinear sample at source coordinates, clamped to the image edges.
fn sample_bilinear(source: &RgbaImage, u: f64, v: f64) -> Rgba<u8> {
    let max_x = (source.width() - 1) as f64;
    let max_y = (source.height() - 1) as f64;
    let u = u.clamp(0.0, max_x);
    let v = v.clamp(0.0, max_y);
    let (x0, y0) = (u.floor() as u32, v.floor() as u32);
    let (x1, y1) = ((x0 + 1).min(source.width() - 1), (y0 + 1).min(source.height() - 1));
    let (tx, ty) = (u - x0 as f64, v - y0 as f64);

    let (a, b) = (source.get_pixel(x0, y0), source.get_pixel(x1, y0));
    let (c, d) = (source.get_pixel(x0, y1), source.get_pixel(x1, y1));
    let mut px = [0u8; 4];
    for (i, out) in px.iter_mut().enumerate() {
        let top = a[i] as f64 * (1.0 - tx) + b[i] as f64 * tx;
        let bottom = c[i] as f64 * (1.0 - tx) + d[i] as f64 * tx;
        *out = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
    }
    Rgba(px)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print::AspectClass;
    use image::{Rgb, Rgba};

    /// A tiny canvas so tests stay fast: 3:4 canvas at 1/100 scale is 54x72.
    const TEST_SCALE: f64 = 0.01;

    fn background() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([200, 180, 160])))
    }

    /// White 3:4 overlay with a black center pixel block.
    fn overlay() -> DynamicImage {
        let mut img = RgbaImage::from_pixel(30, 40, Rgba([255, 255, 255, 255]));
        for y in 15..25 {
            for x in 10..20 {
                img.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }
        DynamicImage::ImageRgba8(img)
    }

    fn canvas() -> CanvasSpec {
        CanvasSpec::for_class(AspectClass::ThreeFour)
    }

    #[test]
    fn test_output_matches_scaled_canvas() {
        let bg = background();
        let ov = overlay();
        let comp = Composition {
            canvas: canvas(),
            background: &bg,
            overlay: &ov,
            placement: PlacementConfig::centered(&canvas()),
            text_layers: &[],
        };
        let out = comp.render_at_scale(TEST_SCALE, FilterType::Nearest).unwrap();
        assert_eq!(out.image.dimensions(), (54, 72));
    }

    #[test]
    fn test_white_overlay_pixels_keep_background() {
        let bg = background();
        let ov = overlay();
        let comp = Composition {
            canvas: canvas(),
            background: &bg,
            overlay: &ov,
            placement: PlacementConfig::centered(&canvas()),
            text_layers: &[],
        };
        let out = comp.render_at_scale(TEST_SCALE, FilterType::Nearest).unwrap();
        assert_eq!(*out.image.get_pixel(1, 1), Rgb([200, 180, 160]));
        // Center is covered by the black stroke
        assert_eq!(*out.image.get_pixel(27, 36), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_overlay_outside_canvas_is_empty_layer() {
        let bg = background();
        let ov = overlay();
        let comp = Composition {
            canvas: canvas(),
            background: &bg,
            overlay: &ov,
            placement: PlacementConfig {
                center_x: -20000.0,
                center_y: 3600.0,
                scale_height: 2000.0,
            },
            text_layers: &[],
        };
        let out = comp.render_at_scale(TEST_SCALE, FilterType::Nearest).unwrap();
        assert!(out.layout.overlay_clip.is_none());
        assert!(out.image.pixels().all(|p| *p == Rgb([200, 180, 160])));
    }

    #[test]
    fn test_zero_overlay_rejected() {
        let bg = background();
        let ov = DynamicImage::new_rgba8(0, 0);
        let comp = Composition {
            canvas: canvas(),
            background: &bg,
            overlay: &ov,
            placement: PlacementConfig::centered(&canvas()),
            text_layers: &[],
        };
        let err = comp.render_at_scale(TEST_SCALE, FilterType::Nearest).unwrap_err();
        assert_eq!(err.code(), "INVALID_OVERLAY");
    }

    fn full_window(rect: &PlacementRect) -> ClipRect {
        rect.clip(rect.width as u32, rect.height as u32).unwrap()
    }

    #[test]
    fn test_letterbox_pads_wide_overlay() {
        let wide = DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 20, Rgba([0, 0, 0, 255])));
        let rect = PlacementRect {
            left: 0,
            top: 0,
            width: 30,
            height: 40,
        };
        let boxed = letterbox_window(&wide, &rect, &full_window(&rect), FilterType::Nearest);
        assert_eq!(boxed.dimensions(), (30, 40));
        // Scaled to 30x15, centered vertically: rows 12..27 opaque
        assert_eq!(boxed.get_pixel(15, 5)[3], 0);
        assert_eq!(boxed.get_pixel(15, 20)[3], 255);
        assert_eq!(boxed.get_pixel(15, 35)[3], 0);
    }

    #[test]
    fn test_window_matches_slice_of_full_box() {
        let ov = overlay();
        let rect = PlacementRect {
            left: -7,
            top: -9,
            width: 30,
            height: 40,
        };
        let full = letterbox_window(&ov, &rect, &full_window(&rect), FilterType::Nearest);
        let clip = rect.clip(12, 20).unwrap();
        let window = letterbox_window(&ov, &rect, &clip, FilterType::Nearest);
        assert_eq!(window.dimensions(), (clip.crop_width, clip.crop_height));
        for (x, y, p) in window.enumerate_pixels() {
            assert_eq!(*p, *full.get_pixel(x + clip.crop_left, y + clip.crop_top));
        }
    }

    #[test]
    fn test_huge_placement_only_renders_visible_window() {
        let bg = background();
        let ov = overlay();
        let comp = Composition {
            canvas: canvas(),
            background: &bg,
            overlay: &ov,
            placement: PlacementConfig {
                center_x: 2700.0,
                center_y: 3600.0,
                scale_height: 40_000_000.0,
            },
            text_layers: &[],
        };
        let out = comp.render_at_scale(TEST_SCALE, FilterType::Nearest).unwrap();
        assert_eq!(out.image.dimensions(), (54, 72));
        // The window sits deep inside the black center block
        assert!(out.image.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn test_sampled_window_keeps_flat_color() {
        let flat = DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 4, Rgba([10, 20, 30, 255])));
        let rect = PlacementConfig {
            center_x: 50.0,
            center_y: 50.0,
            scale_height: 200_000.0,
        }
        .rect()
        .unwrap();
        let clip = rect.clip(100, 100).unwrap();
        let window = letterbox_window(&flat, &rect, &clip, FilterType::Lanczos3);
        assert_eq!(window.dimensions(), (100, 100));
        assert!(window.pixels().all(|p| *p == Rgba([10, 20, 30, 255])));
    }

    #[test]
    fn test_preview_mode_halves_canvas() {
        assert_eq!(RenderMode::Preview.scale(), 0.5);
        assert_eq!(RenderMode::from_preview_flag(false), RenderMode::Full);
        assert_eq!(canvas().scaled_dimensions(RenderMode::Preview.scale()), (2700, 3600));
    }

    #[test]
    fn test_relative_geometry_is_scale_invariant() {
        let bg = background();
        let ov = overlay();
        let placement = PlacementConfig {
            center_x: 1900.0,
            center_y: 4100.0,
            scale_height: 5000.0,
        };
        let comp = Composition {
            canvas: canvas(),
            background: &bg,
            overlay: &ov,
            placement,
            text_layers: &[],
        };
        let small = comp.render_at_scale(0.02, FilterType::Nearest).unwrap().layout;
        let large = comp.render_at_scale(0.04, FilterType::Nearest).unwrap().layout;

        let rel = |v: i64, total: u32| v as f64 / total as f64;
        for (a, b, tol) in [
            (rel(small.overlay.left, small.canvas_width), rel(large.overlay.left, large.canvas_width), 1.0 / 108.0),
            (rel(small.overlay.top, small.canvas_height), rel(large.overlay.top, large.canvas_height), 1.0 / 144.0),
            (rel(small.overlay.height, small.canvas_height), rel(large.overlay.height, large.canvas_height), 1.0 / 144.0),
        ] {
            assert!((a - b).abs() <= tol, "{} vs {}", a, b);
        }
    }
}
