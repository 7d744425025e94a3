//! # Print Pipeline
//!
//! The three operations exposed to callers, working on raw image bytes:
//!
//! - [`composite`]: overlay + background + text → PNG (full or preview)
//! - [`apply_eraser`]: overlay + paint mask → updated overlay
//! - [`export_final`]: full composite → print-size PNG with bleed and DPI
//!
//! Each run is a single synchronous chain that owns its buffers. The HTTP
//! server and the CLI are thin shells around these functions.

pub mod params;

pub use params::{CompositeParams, EraserParams, ExportParams, LayerParams};

use tracing::{debug, info};

use crate::error::{InkframeError, Result};
use crate::eraser::{self, EraserLimits, EraserMask};
use crate::export::{self, ExportSpec};
use crate::generation;
use crate::geometry::{CanvasSpec, PlacementConfig};
use crate::render::background::BackgroundStore;
use crate::render::compositor::{Composited, Composition, RenderMode};
use crate::render::text::visible_layers;
use crate::render::{decode_overlay, encode_png, encode_png_rgba};

/// Composite the layers and encode the result as PNG.
pub fn composite(backgrounds: &BackgroundStore, overlay: &[u8], params: &CompositeParams) -> Result<Vec<u8>> {
    let mode = RenderMode::from_preview_flag(params.preview_flag);
    let composited = render_layers(backgrounds, overlay, &params.layers, mode)?;
    encode_png(&composited.image)
}

/// Validate the layer parameters and run the compositor.
pub fn render_layers(
    backgrounds: &BackgroundStore,
    overlay: &[u8],
    layers: &LayerParams,
    mode: RenderMode,
) -> Result<Composited> {
    let overlay = decode_overlay(overlay)?;
    let canvas = CanvasSpec::resolve(&layers.size_label)?;
    let placement = layers
        .placement_config
        .unwrap_or_else(|| PlacementConfig::centered(&canvas));
    placement.validate()?;
    layers.text_style.title.validate()?;
    layers.text_style.date.validate()?;
    let background = backgrounds.get(layers.background_selector)?;
    let text_layers = visible_layers(&layers.text_style, &layers.title_text, &layers.date_text);

    debug!(
        size = %layers.size_label,
        background = layers.background_selector.name(),
        ?mode,
        text_layers = text_layers.len(),
        "rendering layers"
    );

    Composition {
        canvas,
        background: &background,
        overlay: &overlay,
        placement,
        text_layers: &text_layers,
    }
    .render(mode)
}

/// Overlay returned by [`apply_eraser`].
#[derive(Debug, Clone)]
pub struct ErasedOverlay {
    pub bytes: Vec<u8>,
    /// Source pixels that changed value. Zero means `bytes` is the input.
    pub changed_pixels: usize,
}

impl ErasedOverlay {
    pub fn is_unchanged(&self) -> bool {
        self.changed_pixels == 0
    }

    /// MIME type of `bytes`, sniffed from its magic number.
    pub fn content_type(&self) -> &'static str {
        image::guess_format(&self.bytes)
            .map(|f| f.to_mime_type())
            .unwrap_or("application/octet-stream")
    }
}

/// Whiten the overlay pixels under the paint mask.
///
/// When nothing changes, the input bytes come back untouched.
pub fn apply_eraser(
    overlay: Vec<u8>,
    mask: &[u8],
    params: &EraserParams,
    limits: EraserLimits,
) -> Result<ErasedOverlay> {
    let decoded = decode_overlay(&overlay)?;
    let mask = EraserMask::decode(mask)?;
    let outcome = eraser::erase(
        &decoded,
        mask,
        (params.canvas_width, params.canvas_height),
        params.rect(),
        limits,
    )?;

    if outcome.erased == 0 {
        debug!("eraser changed nothing, returning original bytes");
        return Ok(ErasedOverlay {
            bytes: overlay,
            changed_pixels: 0,
        });
    }

    info!(erased = outcome.erased, "overlay erased");
    Ok(ErasedOverlay {
        bytes: encode_png_rgba(&outcome.overlay)?,
        changed_pixels: outcome.erased,
    })
}

/// Print-ready file returned by [`export_final`].
#[derive(Debug, Clone)]
pub struct ExportedPrint {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub width: u32,
    pub height: u32,
}

/// Full-resolution composite, resized to the print target, bled and tagged
/// with the print DPI.
pub fn export_final(backgrounds: &BackgroundStore, overlay: &[u8], params: &ExportParams) -> Result<ExportedPrint> {
    if overlay.is_empty() {
        return Err(InkframeError::MissingInput("overlay image"));
    }
    let spec = ExportSpec::resolve(&params.layers.size_label, &params.bleed_code)?;
    let composited = render_layers(backgrounds, overlay, &params.layers, RenderMode::Full)?;
    let finished = export::finalize(&composited.image, &spec);
    let (width, height) = finished.dimensions();
    let bytes = export::encode_png_with_dpi(&finished, spec.dpi)?;
    let filename = export::suggested_filename(
        params.filename_hint.as_deref(),
        &params.layers.size_label,
        spec.bleed_px,
    );

    info!(width, height, bleed = spec.bleed_px, %filename, bytes = bytes.len(), "print exported");
    Ok(ExportedPrint {
        bytes,
        filename,
        width,
        height,
    })
}

/// Turn an image-generation response into overlay PNG bytes.
pub fn overlay_from_generation(response: &[u8]) -> Result<Vec<u8>> {
    let generated = generation::extract_image(response)?;
    let decoded = decode_overlay(&generated.bytes)?;
    if image::guess_format(&generated.bytes).ok() == Some(image::ImageFormat::Png) {
        return Ok(generated.bytes);
    }
    debug!(mime = %generated.mime_type, "re-encoding generated overlay as PNG");
    encode_png_rgba(&decoded.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::background::BackgroundSelector;
    use image::{DynamicImage, Rgba, RgbaImage};

    fn png(img: RgbaImage) -> Vec<u8> {
        encode_png_rgba(&img).unwrap()
    }

    fn black_overlay() -> Vec<u8> {
        png(RgbaImage::from_pixel(30, 40, Rgba([0, 0, 0, 255])))
    }

    fn eraser_params() -> EraserParams {
        EraserParams {
            canvas_width: 60,
            canvas_height: 80,
            placement_top: 20,
            placement_left: 10,
            placement_width: 30,
            placement_height: 40,
        }
    }

    fn store() -> BackgroundStore {
        BackgroundStore::new().with(
            BackgroundSelector::White,
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]))),
        )
    }

    #[test]
    fn test_blank_mask_returns_input_bytes() {
        let overlay = black_overlay();
        let mask = png(RgbaImage::new(60, 80));
        let out = apply_eraser(overlay.clone(), &mask, &eraser_params(), EraserLimits::default()).unwrap();
        assert!(out.is_unchanged());
        assert_eq!(out.bytes, overlay);
        assert_eq!(out.content_type(), "image/png");
    }

    #[test]
    fn test_marked_mask_reencodes() {
        let mut m = RgbaImage::new(60, 80);
        m.put_pixel(25, 40, Rgba([255, 255, 255, 255]));
        let out = apply_eraser(black_overlay(), &png(m), &eraser_params(), EraserLimits::default()).unwrap();
        assert_eq!(out.changed_pixels, 1);
        let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (30, 40));
        // (25-10)*30/30 = 15, (40-20)*40/40 = 20
        assert_eq!(*decoded.get_pixel(15, 20), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_eraser_missing_inputs() {
        let err = apply_eraser(Vec::new(), b"x", &eraser_params(), EraserLimits::default()).unwrap_err();
        assert_eq!(err.code(), "MISSING_INPUT");
        let err = apply_eraser(black_overlay(), &[], &eraser_params(), EraserLimits::default()).unwrap_err();
        assert_eq!(err.code(), "MISSING_INPUT");
    }

    #[test]
    fn test_composite_unknown_size() {
        let params = CompositeParams {
            layers: LayerParams {
                size_label: "7x7".to_string(),
                ..LayerParams::default()
            },
            preview_flag: true,
        };
        let err = composite(&store(), &black_overlay(), &params).unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_SIZE");
    }

    #[test]
    fn test_composite_missing_background() {
        let params = CompositeParams {
            layers: LayerParams {
                background_selector: BackgroundSelector::Pink,
                ..LayerParams::default()
            },
            preview_flag: true,
        };
        let err = composite(&store(), &black_overlay(), &params).unwrap_err();
        assert_eq!(err.code(), "ASSET_NOT_FOUND");
        assert!(err.to_string().contains("pink"));
    }

    #[test]
    fn test_composite_rejects_bad_placement() {
        let params = CompositeParams {
            layers: LayerParams {
                placement_config: Some(PlacementConfig {
                    center_x: 0.0,
                    center_y: 0.0,
                    scale_height: 0.0,
                }),
                ..LayerParams::default()
            },
            preview_flag: true,
        };
        let err = composite(&store(), &black_overlay(), &params).unwrap_err();
        assert_eq!(err.code(), "INVALID_PLACEMENT");
    }

    #[test]
    fn test_composite_rejects_oversized_font() {
        let mut layers = LayerParams {
            date_text: "02.02.25".to_string(),
            ..LayerParams::default()
        };
        layers.text_style.date.font_size = 2_000_000.0;
        let params = CompositeParams {
            layers,
            preview_flag: true,
        };
        let err = composite(&store(), &black_overlay(), &params).unwrap_err();
        assert_eq!(err.code(), "INVALID_REQUEST");
    }

    #[test]
    fn test_export_checks_codes_before_rendering() {
        let params = ExportParams {
            bleed_code: "13px".to_string(),
            ..ExportParams::default()
        };
        let err = export_final(&store(), &black_overlay(), &params).unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_BLEED_CODE");

        let err = export_final(&store(), &[], &ExportParams::default()).unwrap_err();
        assert_eq!(err.code(), "MISSING_INPUT");
    }

    #[test]
    fn test_generation_overlay_must_be_an_image() {
        // base64 of "hello"
        let err = overlay_from_generation(br#"{"data":[{"b64_json":"aGVsbG8="}]}"#).unwrap_err();
        assert_eq!(err.code(), "INVALID_OVERLAY");
    }
}
