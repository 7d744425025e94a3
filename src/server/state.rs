//! Server state and configuration.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::eraser::EraserLimits;
use crate::error::Result;
use crate::render::background::BackgroundStore;
use crate::render::text;

/// Default request body limit (50 MB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Directory holding `<selector>.png` background assets
    pub assets_dir: Option<PathBuf>,
    /// TTF/OTF file used for title and date text
    pub font_path: Option<PathBuf>,
    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,
    pub eraser_limits: EraserLimits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            assets_dir: None,
            font_path: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            eraser_limits: EraserLimits::default(),
        }
    }
}

/// Application state shared across handlers. Read-only after startup.
pub struct AppState {
    pub config: ServerConfig,
    pub backgrounds: BackgroundStore,
}

impl AppState {
    pub fn new(config: ServerConfig, backgrounds: BackgroundStore) -> Self {
        Self { config, backgrounds }
    }

    /// Register the font and load background assets named by `config`.
    pub fn load(config: ServerConfig) -> Result<Self> {
        match &config.font_path {
            Some(path) => text::register_font_file(path)?,
            None => warn!("no font configured, requests with text will fail"),
        }

        let backgrounds = match &config.assets_dir {
            Some(dir) => BackgroundStore::load_dir(dir)?,
            None => {
                warn!("no assets directory configured, every background is missing");
                BackgroundStore::new()
            }
        };
        info!(backgrounds = backgrounds.len(), "assets loaded");

        Ok(Self::new(config, backgrounds))
    }
}
