//! # Print Module
//!
//! Print-size and bleed lookup tables.
//!
//! ## Modules
//!
//! - [`config`]: Size labels, aspect classes, bleed codes

pub mod config;

pub use config::{AspectClass, BleedCode, PrintSize, BLEED_CODES, DEFAULT_SIZE_LABEL, PRINT_DPI, PRINT_SIZES};
