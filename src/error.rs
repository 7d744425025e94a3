//! # Error Types
//!
//! This module defines the error taxonomy shared by the pipeline, the CLI and
//! the HTTP server. Every variant carries a stable machine-readable code (see
//! [`InkframeError::code`]) next to its human-readable message.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, InkframeError>;

/// Main error type for inkframe operations
#[derive(Debug, Error)]
pub enum InkframeError {
    /// Required image bytes or parameters were not supplied
    #[error("Missing input: {0}")]
    MissingInput(&'static str),

    /// Print-size label is not in the size table
    #[error("Unknown print size '{0}'")]
    UnknownSize(String),

    /// Bleed code is not in the bleed table
    #[error("Unknown bleed code '{0}'")]
    UnknownBleedCode(String),

    /// Overlay could not be decoded or has degenerate dimensions
    #[error("Invalid overlay: {0}")]
    InvalidOverlay(String),

    /// Placement scale is not a positive finite number
    #[error("Invalid placement: {0}")]
    InvalidPlacement(String),

    /// Malformed request parameters or mask
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No background asset is loaded for the selector
    #[error("Background asset not found for selector '{0}'")]
    AssetNotFound(String),

    /// Final raster could not be serialized
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Text was requested but no usable font is registered
    #[error("Font unavailable: {0}")]
    FontUnavailable(String),

    /// External image-generation response matched no known shape
    #[error("Unexpected generation response: {0}")]
    UnexpectedGenerationResponse(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl InkframeError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            InkframeError::MissingInput(_) => "MISSING_INPUT",
            InkframeError::UnknownSize(_) => "UNKNOWN_SIZE",
            InkframeError::UnknownBleedCode(_) => "UNKNOWN_BLEED_CODE",
            InkframeError::InvalidOverlay(_) => "INVALID_OVERLAY",
            InkframeError::InvalidPlacement(_) => "INVALID_PLACEMENT",
            InkframeError::InvalidRequest(_) => "INVALID_REQUEST",
            InkframeError::AssetNotFound(_) => "ASSET_NOT_FOUND",
            InkframeError::Encoding(_) => "ENCODING_ERROR",
            InkframeError::FontUnavailable(_) => "FONT_UNAVAILABLE",
            InkframeError::UnexpectedGenerationResponse(_) => "UNEXPECTED_GENERATION_RESPONSE",
            InkframeError::Io(_) => "IO_ERROR",
        }
    }

    /// True when the error was caused by the caller's input rather than the host.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            InkframeError::Encoding(_) | InkframeError::FontUnavailable(_) | InkframeError::Io(_)
        )
    }
}
