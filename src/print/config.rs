//! # Print Size Configuration
//!
//! Fixed lookup tables for the supported print sizes and bleed codes.
//!
//! ## Supported Sizes
//!
//! | Label | Aspect | Target (px @ 300 DPI) |
//! |-------|--------|------------------------|
//! | 6x8   | 3:4    | 1800 x 2400  |
//! | 9x12  | 3:4    | 2700 x 3600  |
//! | 12x16 | 3:4    | 3600 x 4800  |
//! | 18x24 | 3:4    | 5400 x 7200  |
//! | 30x40 | 3:4    | 9000 x 12000 |
//! | 4x6   | 2:3    | 1200 x 1800  |
//! | 8x12  | 2:3    | 2400 x 3600  |
//! | 12x18 | 2:3    | 3600 x 5400  |
//! | 16x24 | 2:3    | 4800 x 7200  |
//! | 24x36 | 2:3    | 7200 x 10800 |
//!
//! ## Usage
//!
//! ```
//! use inkframe::print::PrintSize;
//!
//! let size = PrintSize::by_label("30x40").unwrap();
//! assert_eq!(size.target_dimensions(), (9000, 12000));
//! ```

use serde::{Deserialize, Serialize};

/// Print resolution written into exported files.
pub const PRINT_DPI: u32 = 300;

/// Size label used when a caller explicitly opts into a fallback.
pub const DEFAULT_SIZE_LABEL: &str = "18x24";

/// Aspect-ratio class of a print size.
///
/// Each class has exactly one logical canvas size; every layer is composited
/// on that canvas before the final resize to the print target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectClass {
    /// Width:height = 3:4
    #[serde(rename = "3:4")]
    ThreeFour,
    /// Width:height = 2:3
    #[serde(rename = "2:3")]
    TwoThree,
}

impl AspectClass {
    /// Logical canvas size (width, height) for this class.
    ///
    /// ```text
    /// 3:4 → 5400 x 7200
    /// 2:3 → 4800 x 7200
    /// ```
    pub const fn canvas_dimensions(self) -> (u32, u32) {
        match self {
            AspectClass::ThreeFour => (5400, 7200),
            AspectClass::TwoThree => (4800, 7200),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AspectClass::ThreeFour => "3:4",
            AspectClass::TwoThree => "2:3",
        }
    }
}

/// # Print Size
///
/// One row of the size table: a label the client sends, its aspect class and
/// its physical dimensions in inches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintSize {
    /// Label as sent by clients (e.g. "18x24")
    pub label: &'static str,

    /// Aspect-ratio class, selects the logical canvas
    pub aspect: AspectClass,

    /// Physical width in inches
    pub width_in: u32,

    /// Physical height in inches
    pub height_in: u32,
}

/// The full size table.
pub const PRINT_SIZES: &[PrintSize] = &[
    PrintSize::new("6x8", AspectClass::ThreeFour, 6, 8),
    PrintSize::new("9x12", AspectClass::ThreeFour, 9, 12),
    PrintSize::new("12x16", AspectClass::ThreeFour, 12, 16),
    PrintSize::new("18x24", AspectClass::ThreeFour, 18, 24),
    PrintSize::new("30x40", AspectClass::ThreeFour, 30, 40),
    PrintSize::new("4x6", AspectClass::TwoThree, 4, 6),
    PrintSize::new("8x12", AspectClass::TwoThree, 8, 12),
    PrintSize::new("12x18", AspectClass::TwoThree, 12, 18),
    PrintSize::new("16x24", AspectClass::TwoThree, 16, 24),
    PrintSize::new("24x36", AspectClass::TwoThree, 24, 36),
];

impl PrintSize {
    const fn new(label: &'static str, aspect: AspectClass, width_in: u32, height_in: u32) -> Self {
        Self {
            label,
            aspect,
            width_in,
            height_in,
        }
    }

    /// Look up a size by its label.
    pub fn by_label(label: &str) -> Option<&'static PrintSize> {
        PRINT_SIZES.iter().find(|s| s.label == label.trim())
    }

    /// Exact output pixel size at [`PRINT_DPI`].
    #[inline]
    pub fn target_dimensions(&self) -> (u32, u32) {
        (self.width_in * PRINT_DPI, self.height_in * PRINT_DPI)
    }
}

/// A bleed code and the border width it expands to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BleedCode {
    pub code: &'static str,
    pub pixels: u32,
}

/// The full bleed table.
pub const BLEED_CODES: &[BleedCode] = &[
    BleedCode { code: "none", pixels: 0 },
    BleedCode { code: "0px", pixels: 0 },
    BleedCode { code: "75px", pixels: 75 },
    BleedCode { code: "150px", pixels: 150 },
    BleedCode { code: "225px", pixels: 225 },
    BleedCode { code: "300px", pixels: 300 },
    BleedCode { code: "450px", pixels: 450 },
];

impl BleedCode {
    /// Look up a bleed code.
    pub fn by_code(code: &str) -> Option<&'static BleedCode> {
        let code = code.trim();
        BLEED_CODES.iter().find(|b| b.code.eq_ignore_ascii_case(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_label() {
        let size = PrintSize::by_label("18x24").unwrap();
        assert_eq!(size.aspect, AspectClass::ThreeFour);
        assert_eq!(size.target_dimensions(), (5400, 7200));
    }

    #[test]
    fn test_lookup_unknown_label() {
        assert!(PrintSize::by_label("5x5").is_none());
        assert!(PrintSize::by_label("").is_none());
    }

    #[test]
    fn test_table_matches_aspect_class() {
        for size in PRINT_SIZES {
            let (w, h) = size.target_dimensions();
            let (cw, ch) = size.aspect.canvas_dimensions();
            // Same ratio as the class canvas, compared exactly in integers
            assert_eq!(w as u64 * ch as u64, h as u64 * cw as u64, "{}", size.label);
        }
    }

    #[test]
    fn test_labels_unique() {
        let mut labels: Vec<_> = PRINT_SIZES.iter().map(|s| s.label).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), PRINT_SIZES.len());
    }

    #[test]
    fn test_bleed_lookup() {
        assert_eq!(BleedCode::by_code("450px").unwrap().pixels, 450);
        assert_eq!(BleedCode::by_code("none").unwrap().pixels, 0);
        assert_eq!(BleedCode::by_code("450PX").unwrap().pixels, 450);
        assert!(BleedCode::by_code("451px").is_none());
    }

    #[test]
    fn test_default_label_exists() {
        assert!(PrintSize::by_label(DEFAULT_SIZE_LABEL).is_some());
    }
}
