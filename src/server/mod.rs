//! # HTTP Server for Print Compositing
//!
//! Exposes the pipeline operations over HTTP. Image bytes travel as multipart
//! file fields; every other parameter goes in one JSON `params` field.
//!
//! ## Usage
//!
//! ```bash
//! inkframe serve --listen 0.0.0.0:8080 --assets ./assets --font ./fonts/Display.ttf
//! ```
//!
//! ## Routes
//!
//! | Method | Path | Body |
//! |--------|------|------|
//! | POST | `/api/composite` | `overlay`, `params` |
//! | POST | `/api/eraser` | `overlay`, `mask`, `params` |
//! | POST | `/api/export` | `overlay`, `params` |
//! | POST | `/api/generation/extract` | raw generation JSON |
//! | GET | `/api/sizes` | |
//! | GET | `/api/backgrounds` | |

mod handlers;
mod state;

pub use handlers::ApiError;
pub use state::{AppState, DEFAULT_MAX_UPLOAD_BYTES, ServerConfig};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::Result;

/// Build the router over already-loaded state.
pub fn router(state: Arc<AppState>) -> Router {
    let max_upload = state.config.max_upload_bytes;
    Router::new()
        .route("/api/composite", post(handlers::composite::composite))
        .route("/api/eraser", post(handlers::eraser::apply))
        .route("/api/export", post(handlers::export::export))
        .route("/api/generation/extract", post(handlers::generation::extract))
        .route("/api/sizes", get(handlers::lookup::sizes))
        .route("/api/backgrounds", get(handlers::lookup::backgrounds))
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use inkframe::server::{serve, ServerConfig};
///
/// # async fn example() -> inkframe::Result<()> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8080".to_string(),
///     assets_dir: Some("assets".into()),
///     ..ServerConfig::default()
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<()> {
    let state = Arc::new(AppState::load(config)?);
    let listen_addr = state.config.listen_addr.clone();
    let app = router(state.clone());

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    info!(
        addr = %listen_addr,
        backgrounds = state.backgrounds.len(),
        max_upload_bytes = state.config.max_upload_bytes,
        "inkframe server listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
