//! Blend modes for layer compositing.
//!
//! Channel values are normalized to [0.0, 1.0] with 0.0 = black and
//! 1.0 = white. The base canvas is always opaque; layers carry alpha, which
//! acts as the opacity of the blended result.

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// Blend modes used by the compositor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Normal blending - layer replaces base according to its alpha.
    #[default]
    Normal,
    /// Multiply - darkens; white layer pixels leave the base unchanged.
    Multiply,
}

impl BlendMode {
    /// Apply this blend mode to combine base and layer values.
    #[inline]
    pub fn apply(self, base: f32, blend: f32) -> f32 {
        match self {
            BlendMode::Normal => blend,
            BlendMode::Multiply => base * blend,
        }
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Blend one layer pixel onto one opaque base pixel.
#[inline]
pub fn blend_pixel(mode: BlendMode, base: &mut Rgb<u8>, layer: Rgba<u8>) {
    let alpha = layer[3] as f32 / 255.0;
    if alpha <= 0.0 {
        return;
    }
    for c in 0..3 {
        let b = base[c] as f32 / 255.0;
        let l = layer[c] as f32 / 255.0;
        let out = lerp(b, mode.apply(b, l), alpha);
        base[c] = (out.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
}

/// A rectangular region copy: `size` pixels read from `src` at `src_origin`
/// and written onto the base at `dst_origin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub src_origin: (u32, u32),
    pub dst_origin: (u32, u32),
    pub size: (u32, u32),
}

/// Blend a region of `layer` onto `base`.
///
/// Pixels that would fall outside either image are skipped.
pub fn blend_region(base: &mut RgbImage, layer: &RgbaImage, region: Region, mode: BlendMode) {
    let (sx0, sy0) = region.src_origin;
    let (dx0, dy0) = region.dst_origin;
    let w = region
        .size
        .0
        .min(layer.width().saturating_sub(sx0))
        .min(base.width().saturating_sub(dx0));
    let h = region
        .size
        .1
        .min(layer.height().saturating_sub(sy0))
        .min(base.height().saturating_sub(dy0));

    for y in 0..h {
        for x in 0..w {
            let src = *layer.get_pixel(sx0 + x, sy0 + y);
            blend_pixel(mode, base.get_pixel_mut(dx0 + x, dy0 + y), src);
        }
    }
}

/// Blend a whole layer whose top-left corner sits at `(left, top)` on the base.
///
/// The layer may hang over any edge of the base.
pub fn blend_at(base: &mut RgbImage, layer: &RgbaImage, left: i64, top: i64, mode: BlendMode) {
    let src_x = (-left).max(0);
    let src_y = (-top).max(0);
    let dst_x = left.max(0);
    let dst_y = top.max(0);
    if src_x >= layer.width() as i64
        || src_y >= layer.height() as i64
        || dst_x >= base.width() as i64
        || dst_y >= base.height() as i64
    {
        return;
    }
    let region = Region {
        src_origin: (src_x as u32, src_y as u32),
        dst_origin: (dst_x as u32, dst_y as u32),
        size: (
            layer.width() - src_x as u32,
            layer.height() - src_y as u32,
        ),
    };
    blend_region(base, layer, region, mode);
}
