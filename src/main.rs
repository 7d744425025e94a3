//! # Inkframe CLI
//!
//! Command-line interface for compositing and exporting line-art prints.
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP API
//! inkframe serve --listen 0.0.0.0:8080 --assets ./assets --font ./fonts/Display.ttf
//!
//! # Half-resolution preview of a print
//! inkframe composite --overlay art.png --out preview.png --date 02.02.25 --preview
//!
//! # Whiten overlay strokes under a painted mask
//! inkframe erase --overlay art.png --mask mask.png --canvas-width 2700 --canvas-height 3600 \
//!     --top -200 --left 0 --width 2700 --height 3600 --out art.png
//!
//! # Print-ready 30x40 with a 450px bleed
//! inkframe export --overlay art.png --size 30x40 --bleed 450px
//!
//! # Show the size and bleed tables
//! inkframe sizes
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use inkframe::{
    CanvasSpec, InkframeError, PlacementConfig,
    eraser::EraserLimits,
    pipeline::{self, CompositeParams, EraserParams, ExportParams, LayerParams},
    print::{BLEED_CODES, DEFAULT_SIZE_LABEL, PRINT_SIZES, PrintSize},
    render::{background::{BackgroundSelector, BackgroundStore}, text},
    server::{self, DEFAULT_MAX_UPLOAD_BYTES, ServerConfig},
};

/// Inkframe - Line-art print compositor
#[derive(Parser, Debug)]
#[command(name = "inkframe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8080")]
        listen: String,

        /// Directory with background assets (<selector>.png)
        #[arg(long, value_name = "DIR")]
        assets: Option<PathBuf>,

        /// Font file for title and date text
        #[arg(long, value_name = "FILE")]
        font: Option<PathBuf>,

        /// Request body limit in megabytes
        #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES / (1024 * 1024))]
        max_upload_mb: usize,
    },

    /// Composite a print and write it as PNG
    Composite {
        #[command(flatten)]
        layers: LayerArgs,

        /// Output PNG path
        #[arg(long, value_name = "FILE")]
        out: PathBuf,

        /// Render at half resolution
        #[arg(long)]
        preview: bool,
    },

    /// Whiten overlay pixels under a painted mask
    Erase {
        #[arg(long, value_name = "FILE")]
        overlay: PathBuf,

        /// Paint mask, at display or canvas resolution
        #[arg(long, value_name = "FILE")]
        mask: PathBuf,

        #[arg(long)]
        canvas_width: u32,

        #[arg(long)]
        canvas_height: u32,

        /// Placement top edge in canvas pixels
        #[arg(long, allow_hyphen_values = true)]
        top: i64,

        /// Placement left edge in canvas pixels
        #[arg(long, allow_hyphen_values = true)]
        left: i64,

        /// Placement width in canvas pixels
        #[arg(long)]
        width: i64,

        /// Placement height in canvas pixels
        #[arg(long)]
        height: i64,

        /// Output path (may be the overlay itself)
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
    },

    /// Export the print-ready PNG at the physical print size
    Export {
        #[command(flatten)]
        layers: LayerArgs,

        /// Bleed code (none, 0px, 75px, 150px, 225px, 300px, 450px)
        #[arg(long, default_value = "none")]
        bleed: String,

        /// Output path (defaults to the suggested filename)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// List print sizes and bleed codes
    Sizes,
}

/// Layer options shared by `composite` and `export`.
#[derive(Args, Debug)]
struct LayerArgs {
    /// Line-art overlay image
    #[arg(long, value_name = "FILE")]
    overlay: PathBuf,

    /// Print size label
    #[arg(long, default_value = DEFAULT_SIZE_LABEL)]
    size: String,

    /// Background selector (white, cream, pink, blue, green)
    #[arg(long, default_value = "white")]
    background: BackgroundSelector,

    /// Directory with background assets
    #[arg(long, value_name = "DIR", default_value = "assets")]
    assets: PathBuf,

    /// Font file for title and date text
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Overlay center X in canvas pixels (defaults to centered)
    #[arg(long, allow_hyphen_values = true, requires_all = ["center_y", "scale_height"])]
    center_x: Option<f64>,

    #[arg(long, allow_hyphen_values = true, requires_all = ["center_x", "scale_height"])]
    center_y: Option<f64>,

    /// Overlay height in canvas pixels
    #[arg(long, requires_all = ["center_x", "center_y"])]
    scale_height: Option<f64>,

    /// Title text (empty to omit)
    #[arg(long, default_value = "")]
    title: String,

    /// Date text (empty to omit)
    #[arg(long, default_value = "")]
    date: String,
}

impl LayerArgs {
    /// Register the font, load backgrounds and build the layer parameters.
    fn prepare(&self) -> Result<(BackgroundStore, Vec<u8>, LayerParams), InkframeError> {
        if let Some(font) = &self.font {
            text::register_font_file(font)?;
        }
        let backgrounds = BackgroundStore::load_dir(&self.assets)?;
        let overlay = std::fs::read(&self.overlay)?;

        let size_label = effective_size(&self.size);
        let placement_config = match (self.center_x, self.center_y, self.scale_height) {
            (Some(center_x), Some(center_y), Some(scale_height)) => Some(PlacementConfig {
                center_x,
                center_y,
                scale_height,
            }),
            _ => None,
        };

        let params = LayerParams {
            placement_config,
            title_text: self.title.clone(),
            date_text: self.date.clone(),
            background_selector: self.background,
            size_label: size_label.to_string(),
            ..LayerParams::default()
        };
        Ok((backgrounds, overlay, params))
    }
}

/// Unknown labels fall back to the default size on the command line.
fn effective_size(label: &str) -> &'static str {
    let canvas = CanvasSpec::resolve_or_default(label);
    let size = PrintSize::by_label(label).map_or(DEFAULT_SIZE_LABEL, |s| s.label);
    debug!(size, width = canvas.width, height = canvas.height, "canvas resolved");
    size
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error [{}]: {}", e.code(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), InkframeError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            listen,
            assets,
            font,
            max_upload_mb,
        } => {
            let config = ServerConfig {
                listen_addr: listen,
                assets_dir: assets,
                font_path: font,
                max_upload_bytes: max_upload_mb * 1024 * 1024,
                eraser_limits: EraserLimits::default(),
            };
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(config))
        }

        Commands::Composite { layers, out, preview } => {
            let (backgrounds, overlay, layers) = layers.prepare()?;
            let params = CompositeParams {
                layers,
                preview_flag: preview,
            };
            let png = pipeline::composite(&backgrounds, &overlay, &params)?;
            write_output(&out, &png)
        }

        Commands::Erase {
            overlay,
            mask,
            canvas_width,
            canvas_height,
            top,
            left,
            width,
            height,
            out,
        } => {
            let params = EraserParams {
                canvas_width,
                canvas_height,
                placement_top: top,
                placement_left: left,
                placement_width: width,
                placement_height: height,
            };
            let overlay = std::fs::read(&overlay)?;
            let mask = std::fs::read(&mask)?;
            let erased = pipeline::apply_eraser(overlay, &mask, &params, EraserLimits::default())?;
            info!(changed = erased.changed_pixels, "eraser finished");
            write_output(&out, &erased.bytes)
        }

        Commands::Export { layers, bleed, out } => {
            let (backgrounds, overlay, layers) = layers.prepare()?;
            let params = ExportParams {
                layers,
                bleed_code: bleed,
                filename_hint: None,
            };
            let print = pipeline::export_final(&backgrounds, &overlay, &params)?;
            let out = out.unwrap_or_else(|| PathBuf::from(&print.filename));
            info!(width = print.width, height = print.height, "export finished");
            write_output(&out, &print.bytes)
        }

        Commands::Sizes => {
            println!("Print sizes (default {}):", DEFAULT_SIZE_LABEL);
            for size in PRINT_SIZES {
                let canvas = CanvasSpec::for_class(size.aspect);
                let (tw, th) = size.target_dimensions();
                println!(
                    "  {:<6} {}  canvas {}x{}  target {}x{}",
                    size.label,
                    size.aspect.name(),
                    canvas.width,
                    canvas.height,
                    tw,
                    th
                );
            }
            println!("\nBleed codes:");
            for bleed in BLEED_CODES {
                println!("  {:<6} {}px", bleed.code, bleed.pixels);
            }
            Ok(())
        }
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<(), InkframeError> {
    std::fs::write(path, bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "written");
    Ok(())
}
