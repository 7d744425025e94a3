//! # Inkframe - Line-Art Print Compositor
//!
//! Inkframe turns a generated line-art drawing into a print-ready file. It
//! provides:
//!
//! - **Canvas geometry**: print-size lookup and the logical canvas per aspect class
//! - **Placement**: center + height placement, clipping and canvas ↔ source mapping
//! - **Compositing**: background, multiplied overlay and text layers (full / preview)
//! - **Eraser**: whitening overlay pixels under a painted mask
//! - **Export**: resize to the physical target, white bleed border, 300 DPI PNG
//!
//! ## Quick Start
//!
//! ```no_run
//! use inkframe::{
//!     pipeline::{self, ExportParams},
//!     render::background::BackgroundStore,
//! };
//!
//! let backgrounds = BackgroundStore::load_dir("assets".as_ref())?;
//! let overlay = std::fs::read("lineart.png")?;
//!
//! let params = ExportParams {
//!     bleed_code: "150px".to_string(),
//!     ..ExportParams::default()
//! };
//! let print = pipeline::export_final(&backgrounds, &overlay, &params)?;
//! std::fs::write(&print.filename, &print.bytes)?;
//!
//! # Ok::<(), inkframe::InkframeError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`print`] | Size and bleed tables |
//! | [`geometry`] | Canvas resolution and placement math |
//! | [`render`] | Blending, text and the layer compositor |
//! | [`eraser`] | Mask-driven overlay eraser |
//! | [`export`] | Bleed finalizer and DPI-tagged PNG |
//! | [`generation`] | Image-generation response parsing |
//! | [`pipeline`] | Byte-level operations used by the CLI and server |
//! | [`server`] | HTTP API |
//! | [`error`] | Error types |

pub mod eraser;
pub mod error;
pub mod export;
pub mod generation;
pub mod geometry;
pub mod pipeline;
pub mod print;
pub mod render;
pub mod server;

// Re-exports for convenience
pub use error::{InkframeError, Result};
pub use geometry::{CanvasSpec, PlacementConfig, PlacementRect};
pub use print::PrintSize;
