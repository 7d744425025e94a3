//! HTTP handlers for the server.

pub mod composite;
pub mod eraser;
pub mod export;
pub mod generation;
pub mod lookup;

use std::collections::HashMap;

use axum::{
    Json,
    extract::Multipart,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{error, info_span, warn};
use uuid::Uuid;

use crate::error::InkframeError;

/// Error returned by every handler.
#[derive(Debug)]
pub enum ApiError {
    /// The pipeline rejected the request or failed.
    Pipeline(InkframeError),
    /// The blocking task panicked or was cancelled.
    Task(String),
}

impl From<InkframeError> for ApiError {
    fn from(e: InkframeError) -> Self {
        ApiError::Pipeline(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Pipeline(InkframeError::AssetNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Pipeline(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(_) | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Pipeline(e) => e.code(),
            ApiError::Task(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = match &self {
            ApiError::Pipeline(e) => e.to_string(),
            ApiError::Task(msg) => format!("Processing error: {}", msg),
        };

        if status.is_server_error() {
            error!(code, %message, "request failed");
        } else {
            warn!(code, %message, "request rejected");
        }

        (
            status,
            Json(json!({
                "success": false,
                "errorCode": code,
                "error": message,
            })),
        )
            .into_response()
    }
}

/// Fields of a multipart upload: file bytes by field name plus the JSON
/// `params` field.
#[derive(Debug, Default)]
pub struct Upload {
    files: HashMap<String, Vec<u8>>,
    params: Option<String>,
}

impl Upload {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut upload = Upload::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| InkframeError::InvalidRequest(format!("Multipart error: {}", e)))?
        {
            let name = field.name().unwrap_or("").to_string();
            if name == "params" {
                let text = field.text().await.map_err(|e| {
                    InkframeError::InvalidRequest(format!("Failed to read params: {}", e))
                })?;
                upload.params = Some(text);
            } else {
                let bytes = field.bytes().await.map_err(|e| {
                    InkframeError::InvalidRequest(format!("Failed to read field '{}': {}", name, e))
                })?;
                upload.files.insert(name, bytes.to_vec());
            }
        }
        Ok(upload)
    }

    /// Bytes of a file field; empty when the field is absent.
    pub fn take_file(&mut self, name: &str) -> Vec<u8> {
        self.files.remove(name).unwrap_or_default()
    }

    /// Parse the `params` field, which must be present.
    pub fn params<T: DeserializeOwned>(&self) -> Result<T, InkframeError> {
        let raw = self.params.as_deref().ok_or(InkframeError::MissingInput("params"))?;
        parse_params(raw)
    }

    /// Parse the `params` field, falling back to defaults when absent.
    pub fn params_or_default<T: DeserializeOwned + Default>(&self) -> Result<T, InkframeError> {
        match self.params.as_deref() {
            Some(raw) => parse_params(raw),
            None => Ok(T::default()),
        }
    }
}

fn parse_params<T: DeserializeOwned>(raw: &str) -> Result<T, InkframeError> {
    serde_json::from_str(raw).map_err(|e| InkframeError::InvalidRequest(format!("Invalid params: {}", e)))
}

/// Run a CPU-bound pipeline step on the blocking pool, inside a span tagged
/// with a fresh job id.
pub async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> crate::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let span = info_span!("job", id = %Uuid::new_v4());
    tokio::task::spawn_blocking(move || span.in_scope(f))
        .await
        .map_err(|e| ApiError::Task(e.to_string()))?
        .map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (InkframeError::MissingInput("overlay image"), StatusCode::BAD_REQUEST),
            (InkframeError::UnknownSize("1x1".into()), StatusCode::BAD_REQUEST),
            (InkframeError::AssetNotFound("pink".into()), StatusCode::NOT_FOUND),
            (InkframeError::Encoding("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (InkframeError::FontUnavailable("none".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
        assert_eq!(ApiError::Task("panicked".into()).code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_params_parsing() {
        let upload = Upload {
            files: HashMap::new(),
            params: Some("{not json".to_string()),
        };
        let err = upload.params::<serde_json::Value>().unwrap_err();
        assert_eq!(err.code(), "INVALID_REQUEST");

        let empty = Upload::default();
        assert_eq!(
            empty.params::<serde_json::Value>().unwrap_err().code(),
            "MISSING_INPUT"
        );
        let v: Vec<u8> = empty.params_or_default().unwrap();
        assert!(v.is_empty());
    }
}
