//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::Path;

use image::{DynamicImage, Pixel, RgbImage, Rgba, RgbaImage};
use inkframe::render::background::{BackgroundSelector, BackgroundStore};
use inkframe::render::text;

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Register a system font (or `INKFRAME_TEST_FONT`). False when none exists
/// and the calling test should skip.
pub fn ensure_font() -> bool {
    if text::is_font_registered() {
        return true;
    }
    let env = std::env::var("INKFRAME_TEST_FONT").ok();
    let Some(path) = env
        .iter()
        .map(String::as_str)
        .chain(FONT_CANDIDATES.iter().copied())
        .find(|p| Path::new(p).exists())
    else {
        eprintln!("no test font found, skipping");
        return false;
    };
    text::register_font_file(Path::new(path)).is_ok() && text::is_font_registered()
}

pub fn encode(img: &RgbaImage) -> Vec<u8> {
    inkframe::render::encode_png_rgba(img).unwrap()
}

/// Opaque black overlay, 3:4.
pub fn black_overlay_png(width: u32, height: u32) -> Vec<u8> {
    encode(&RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])))
}

/// White 3:4 overlay with a black square in the middle.
pub fn line_art() -> DynamicImage {
    let mut img = RgbaImage::from_pixel(30, 40, Rgba([255, 255, 255, 255]));
    for y in 15..25 {
        for x in 10..20 {
            img.put_pixel(x, y, Rgba([0, 0, 0, 255]));
        }
    }
    DynamicImage::ImageRgba8(img)
}

/// Store holding only the white and cream backgrounds.
pub fn backgrounds() -> BackgroundStore {
    BackgroundStore::new()
        .with(
            BackgroundSelector::White,
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]))),
        )
        .with(
            BackgroundSelector::Cream,
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([245, 238, 220, 255]))),
        )
}

/// Cream background already at canvas size, so renders skip the resize.
pub const CREAM: Rgba<u8> = Rgba([245, 238, 220, 255]);

pub fn full_size_backgrounds(width: u32, height: u32) -> BackgroundStore {
    BackgroundStore::new().with(
        BackgroundSelector::White,
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, CREAM.to_rgb())),
    )
}

/// Read the `pHYs` density (pixels per meter) and dimensions of a PNG.
pub fn png_density(bytes: &[u8]) -> (u32, u32, u32) {
    let reader = png::Decoder::new(bytes).read_info().unwrap();
    let info = reader.info();
    let dims = info.pixel_dims.unwrap();
    assert_eq!(dims.unit, png::Unit::Meter);
    assert_eq!(dims.xppu, dims.yppu);
    (dims.xppu, info.width, info.height)
}
