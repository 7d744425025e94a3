//! Text layers (title and date).
//!
//! Renders a single line of text with ab_glyph into a tight RGBA raster that
//! the compositor alpha-blends onto the canvas. The font is registered once
//! per process and shared by every request.

use std::path::Path;
use std::sync::OnceLock;

use ab_glyph::{Font, FontArc, GlyphId, ScaleFont, point};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::color::Color;
use crate::error::{InkframeError, Result};
use crate::geometry::round_half_away;

static FONT: OnceLock<FontArc> = OnceLock::new();

/// Largest accepted font size, in canvas pixels: one full canvas height.
pub const MAX_FONT_SIZE: f32 = 7200.0;

/// Register the process-wide font.
///
/// Only the first registration takes effect; later calls are ignored so a
/// request can never swap the font under another one.
pub fn register_font(bytes: Vec<u8>) -> Result<()> {
    if FONT.get().is_some() {
        debug!("font already registered, ignoring");
        return Ok(());
    }
    let font = FontArc::try_from_vec(bytes)
        .map_err(|e| InkframeError::FontUnavailable(format!("invalid font data: {}", e)))?;
    if FONT.set(font).is_err() {
        debug!("font registered concurrently, keeping the first one");
    }
    Ok(())
}

/// Read a TTF/OTF file and register it.
pub fn register_font_file(path: &Path) -> Result<()> {
    let bytes = std::fs::read(path).map_err(|e| {
        InkframeError::FontUnavailable(format!("failed to read {}: {}", path.display(), e))
    })?;
    register_font(bytes)?;
    info!(path = %path.display(), "font registered");
    Ok(())
}

pub fn is_font_registered() -> bool {
    FONT.get().is_some()
}

/// The registered font, or `FontUnavailable` if none was registered.
pub fn font() -> Result<&'static FontArc> {
    FONT.get()
        .ok_or_else(|| InkframeError::FontUnavailable("no font registered".to_string()))
}

/// Visual style of one text layer, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font_size: f32,
    /// Top of the line box.
    pub top_y: f32,
    #[serde(default)]
    pub color: Color,
    /// Extra advance inserted between consecutive glyphs.
    #[serde(default)]
    pub letter_spacing: f32,
}

impl TextStyle {
    pub fn scaled(&self, scale: f64) -> Self {
        let s = scale as f32;
        Self {
            font_size: self.font_size * s,
            top_y: self.top_y * s,
            color: self.color,
            letter_spacing: self.letter_spacing * s,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.font_size.is_finite() || self.font_size < 0.0 {
            return Err(InkframeError::InvalidRequest(format!(
                "fontSize must be non-negative, got {}",
                self.font_size
            )));
        }
        if self.font_size > MAX_FONT_SIZE {
            return Err(InkframeError::InvalidRequest(format!(
                "fontSize must be at most {}, got {}",
                MAX_FONT_SIZE, self.font_size
            )));
        }
        if !self.top_y.is_finite() || !self.letter_spacing.is_finite() {
            return Err(InkframeError::InvalidRequest(
                "topY and letterSpacing must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Styles for the two text layers, at full canvas resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyles {
    pub title: TextStyle,
    pub date: TextStyle,
}

impl Default for TextStyles {
    fn default() -> Self {
        Self {
            title: TextStyle {
                font_size: 320.0,
                top_y: 420.0,
                color: Color::INK,
                letter_spacing: 12.0,
            },
            date: TextStyle {
                font_size: 180.0,
                top_y: 6600.0,
                color: Color::INK,
                letter_spacing: 24.0,
            },
        }
    }
}

/// A text layer: style plus content.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayer {
    pub style: TextStyle,
    pub text: String,
}

impl TextLayer {
    pub fn new(style: TextStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }

    /// Layers with empty text are skipped entirely.
    pub fn is_visible(&self) -> bool {
        !self.text.trim().is_empty() && self.style.font_size > 0.0
    }
}

/// Title then date, dropping any layer that would render nothing.
pub fn visible_layers(styles: &TextStyles, title: &str, date: &str) -> Vec<TextLayer> {
    [
        TextLayer::new(styles.title, title),
        TextLayer::new(styles.date, date),
    ]
    .into_iter()
    .filter(TextLayer::is_visible)
    .collect()
}

/// A rendered text layer positioned in canvas space.
#[derive(Debug, Clone)]
pub struct TextRaster {
    pub left: i64,
    pub top: i64,
    pub image: RgbaImage,
}

/// Render one text layer, horizontally centered on a canvas of
/// `(width, height)`.
///
/// The raster is clipped to the canvas. Returns `None` for layers that
/// produce no visible pixels.
pub fn render_text_layer(
    font: &FontArc,
    layer: &TextLayer,
    canvas: (u32, u32),
) -> Result<Option<TextRaster>> {
    layer.style.validate()?;
    if !layer.is_visible() {
        return Ok(None);
    }
    let (canvas_width, canvas_height) = canvas;

    let px = layer.style.font_size;
    let scaled = font.as_scaled(px);

    // Layout: caret positions with kerning and letter spacing
    let mut glyphs: Vec<(GlyphId, f32)> = Vec::new();
    let mut caret_x = 0.0f32;
    let mut prev: Option<GlyphId> = None;
    for ch in layer.text.chars().filter(|c| !c.is_control()) {
        let glyph_id = font.glyph_id(ch);
        if let Some(p) = prev {
            caret_x += scaled.kern(p, glyph_id) + layer.style.letter_spacing;
        }
        glyphs.push((glyph_id, caret_x));
        caret_x += scaled.h_advance(glyph_id);
        prev = Some(glyph_id);
    }
    let text_width = caret_x.max(0.0);
    let baseline_y = scaled.ascent();
    let line_left = round_half_away((canvas_width as f64 - text_width as f64) / 2.0);
    let line_top = round_half_away(layer.style.top_y as f64);

    // Glyph pixel bounds in canvas space, dropping glyphs off the canvas
    let outlined: Vec<_> = glyphs
        .iter()
        .filter_map(|&(id, x)| {
            font.outline_glyph(id.with_scale_and_position(px, point(x, baseline_y)))
        })
        .map(|g| {
            let b = g.px_bounds();
            let bounds = (
                line_left + b.min.x as i64,
                line_top + b.min.y as i64,
                line_left + b.max.x as i64,
                line_top + b.max.y as i64,
            );
            (g, bounds)
        })
        .filter(|&(_, (x0, y0, x1, y1))| {
            x1 > 0 && y1 > 0 && x0 < canvas_width as i64 && y0 < canvas_height as i64
        })
        .collect();
    if outlined.is_empty() {
        return Ok(None);
    }

    // Union of the remaining bounds, clipped to the canvas
    let (mut left, mut top) = (i64::MAX, i64::MAX);
    let (mut right, mut bottom) = (i64::MIN, i64::MIN);
    for &(_, (x0, y0, x1, y1)) in &outlined {
        left = left.min(x0);
        top = top.min(y0);
        right = right.max(x1);
        bottom = bottom.max(y1);
    }
    let left = left.max(0);
    let top = top.max(0);
    let width = (right.min(canvas_width as i64) - left).max(1) as u32;
    let height = (bottom.min(canvas_height as i64) - top).max(1) as u32;

    let mut coverage = vec![0.0f32; width as usize * height as usize];
    for (g, (gx0, gy0, _, _)) in &outlined {
        let ox = gx0 - left;
        let oy = gy0 - top;
        g.draw(|gx, gy, c| {
            let x = ox + gx as i64;
            let y = oy + gy as i64;
            if x >= 0 && y >= 0 && x < width as i64 && y < height as i64 {
                let idx = y as usize * width as usize + x as usize;
                coverage[idx] = (coverage[idx] + c).min(1.0);
            }
        });
    }

    let [r, g, b, a] = layer.style.color.0;
    let image = RgbaImage::from_fn(width, height, |x, y| {
        let c = coverage[y as usize * width as usize + x as usize];
        Rgba([r, g, b, (a as f32 * c).round() as u8])
    });

    Ok(Some(TextRaster { left, top, image }))
}
