//! # Generation Response Parsing
//!
//! The line art usually comes back from an external image-generation
//! service. This module does not talk to the service; it only turns the
//! service's JSON response into overlay bytes.
//!
//! Known response shapes are enumerated explicitly:
//!
//! ```text
//! Candidates: {"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":..,"data":..}}]}}]}
//! DataList:   {"data":[{"b64_json": ..}]}
//! ```
//!
//! A response matching neither is an error, never a guess.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use crate::error::{InkframeError, Result};

/// Image bytes extracted from a generation response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// The response shapes we accept.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GenerationResponse {
    Candidates { candidates: Vec<Candidate> },
    DataList { data: Vec<DataItem> },
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// One content part; only inline image data is of interest.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Inline {
        #[serde(rename = "inlineData", alias = "inline_data")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
    Other(serde::de::IgnoredAny),
}

#[derive(Debug, Deserialize)]
pub struct InlineData {
    #[serde(rename = "mimeType", alias = "mime_type", default = "default_mime")]
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Deserialize)]
pub struct DataItem {
    pub b64_json: String,
}

fn default_mime() -> String {
    "image/png".to_string()
}

fn decode_base64(data: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(data.trim())
        .map_err(|e| InkframeError::UnexpectedGenerationResponse(format!("invalid base64 payload: {}", e)))
}

impl GenerationResponse {
    pub fn parse(json: &[u8]) -> Result<Self> {
        serde_json::from_slice(json).map_err(|e| {
            InkframeError::UnexpectedGenerationResponse(format!("no known response shape matched: {}", e))
        })
    }

    /// The first image in the response.
    pub fn into_image(self) -> Result<GeneratedImage> {
        match self {
            GenerationResponse::Candidates { candidates } => {
                let inline = candidates
                    .into_iter()
                    .filter_map(|c| c.content)
                    .flat_map(|c| c.parts)
                    .find_map(|p| match p {
                        Part::Inline { inline_data } => Some(inline_data),
                        Part::Text { .. } | Part::Other(_) => None,
                    })
                    .ok_or_else(|| {
                        InkframeError::UnexpectedGenerationResponse(
                            "response has no inline image data".to_string(),
                        )
                    })?;
                Ok(GeneratedImage {
                    bytes: decode_base64(&inline.data)?,
                    mime_type: inline.mime_type,
                })
            }
            GenerationResponse::DataList { data } => {
                let item = data.into_iter().next().ok_or_else(|| {
                    InkframeError::UnexpectedGenerationResponse("response data list is empty".to_string())
                })?;
                Ok(GeneratedImage {
                    bytes: decode_base64(&item.b64_json)?,
                    mime_type: default_mime(),
                })
            }
        }
    }
}

/// Parse a raw response body and extract its image.
pub fn extract_image(json: &[u8]) -> Result<GeneratedImage> {
    GenerationResponse::parse(json)?.into_image()
}
