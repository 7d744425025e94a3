//! Background templates.
//!
//! Backgrounds are keyed by a small color selector and loaded once from an
//! asset directory (`<selector>.png` or `<selector>.jpg`). Requests only read
//! from the store.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{InkframeError, Result};

/// Background color selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundSelector {
    #[default]
    White,
    Cream,
    Pink,
    Blue,
    Green,
}

impl BackgroundSelector {
    pub fn all() -> &'static [BackgroundSelector] {
        &[
            BackgroundSelector::White,
            BackgroundSelector::Cream,
            BackgroundSelector::Pink,
            BackgroundSelector::Blue,
            BackgroundSelector::Green,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            BackgroundSelector::White => "white",
            BackgroundSelector::Cream => "cream",
            BackgroundSelector::Pink => "pink",
            BackgroundSelector::Blue => "blue",
            BackgroundSelector::Green => "green",
        }
    }
}

impl fmt::Display for BackgroundSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackgroundSelector {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        BackgroundSelector::all()
            .iter()
            .copied()
            .find(|sel| sel.name() == s)
            .ok_or_else(|| format!("unknown background '{}'", s))
    }
}

const EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Loaded background images.
#[derive(Debug, Clone, Default)]
pub struct BackgroundStore {
    images: HashMap<BackgroundSelector, Arc<DynamicImage>>,
}

impl BackgroundStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every selector that has a file in `dir`.
    ///
    /// Missing files are logged, not fatal; requests for them fail later
    /// with `AssetNotFound`. Files that exist but fail to decode are errors.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut store = Self::new();
        for &selector in BackgroundSelector::all() {
            let found = EXTENSIONS
                .iter()
                .map(|ext| dir.join(format!("{}.{}", selector.name(), ext)))
                .find(|p| p.is_file());

            match found {
                Some(path) => {
                    let img = image::open(&path).map_err(|e| {
                        InkframeError::Io(std::io::Error::new(
                            std::io::ErrorKind::InvalidData,
                            format!("failed to decode {}: {}", path.display(), e),
                        ))
                    })?;
                    info!(
                        selector = selector.name(),
                        width = img.width(),
                        height = img.height(),
                        "background loaded"
                    );
                    store.insert(selector, img);
                }
                None => warn!(selector = selector.name(), dir = %dir.display(), "no background asset"),
            }
        }
        Ok(store)
    }

    pub fn insert(&mut self, selector: BackgroundSelector, image: DynamicImage) {
        self.images.insert(selector, Arc::new(image));
    }

    pub fn with(mut self, selector: BackgroundSelector, image: DynamicImage) -> Self {
        self.insert(selector, image);
        self
    }

    pub fn get(&self, selector: BackgroundSelector) -> Result<Arc<DynamicImage>> {
        self.images
            .get(&selector)
            .cloned()
            .ok_or_else(|| InkframeError::AssetNotFound(selector.name().to_string()))
    }

    pub fn contains(&self, selector: BackgroundSelector) -> bool {
        self.images.contains_key(&selector)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_selector_parse() {
        assert_eq!("Cream".parse::<BackgroundSelector>().unwrap(), BackgroundSelector::Cream);
        assert!("purple".parse::<BackgroundSelector>().is_err());
    }

    #[test]
    fn test_selector_serde_name() {
        let json = serde_json::to_string(&BackgroundSelector::Pink).unwrap();
        assert_eq!(json, "\"pink\"");
    }

    #[test]
    fn test_missing_asset_names_selector() {
        let store = BackgroundStore::new();
        let err = store.get(BackgroundSelector::Green).unwrap_err();
        assert_eq!(err.code(), "ASSET_NOT_FOUND");
        assert!(err.to_string().contains("green"));
    }

    #[test]
    fn test_insert_and_get() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([1, 2, 3])));
        let store = BackgroundStore::new().with(BackgroundSelector::Blue, img);
        assert!(store.contains(BackgroundSelector::Blue));
        assert_eq!(store.get(BackgroundSelector::Blue).unwrap().width(), 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_load_dir() {
        let dir = std::env::temp_dir().join(format!("inkframe-bg-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        RgbImage::from_pixel(3, 4, Rgb([250, 240, 220]))
            .save(dir.join("cream.png"))
            .unwrap();

        let store = BackgroundStore::load_dir(&dir).unwrap();
        assert!(store.contains(BackgroundSelector::Cream));
        assert!(!store.contains(BackgroundSelector::White));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
