//! HTTP server module.
//!
//! This module exposes the recommendation pipeline over HTTP. It parses the
//! multipart form, stores an uploaded image for the duration of the request,
//! runs the [`Recommender`] and renders the outcome as HTML.
//!
//! # Routes
//! - `GET /` - upload form
//! - `GET /health` - liveness probe
//! - `POST /recommend` - multipart `text` and/or `image`, always answered
//!   with `200` HTML unless the form itself is unreadable

pub mod render;
pub mod upload;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use thiserror::Error;

use crate::query::{RecommendRequest, Recommender};
use render::render_recommendation;
use upload::store_upload;

const INDEX_HTML: &str = include_str!("index.html");

/// Errors that can occur while serving requests.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The multipart body could not be read
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The upload could not be written to local storage
    #[error("Upload failed: {0}")]
    UploadError(#[from] std::io::Error),

    /// Server initialization error
    #[error("Initialization error: {0}")]
    InitializationError(String),

    /// Other unexpected errors
    #[error("Server error: {0}")]
    Other(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match self {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::UploadError(_)
            | ServerError::InitializationError(_)
            | ServerError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Directory holding in-flight uploads
    pub upload_dir: PathBuf,

    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            upload_dir: PathBuf::from("uploads"),
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Parse `host:port` into a socket address.
    pub fn bind_addr(&self) -> ServerResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ServerError::InitializationError(format!("invalid bind address: {}", e)))
    }
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub upload_dir: Arc<PathBuf>,
}

/// Build the application router.
pub fn create_router(recommender: Arc<Recommender>, config: &ServerConfig) -> Router {
    let state = AppState {
        recommender,
        upload_dir: Arc::new(config.upload_dir.clone()),
    };

    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/recommend", post(handle_recommend))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .with_state(state)
}

async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn handle_health() -> &'static str {
    "ok"
}

/// Handle `POST /recommend`.
///
/// Recognized fields are `text` and `image`; anything else is ignored, as
/// is every `image` part after the first. A file part with no filename and
/// no bytes is what browsers send for an empty file input and counts as no
/// image.
pub async fn handle_recommend(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ServerResult<Html<String>> {
    let mut text: Option<String> = None;
    let mut upload: Option<tempfile::NamedTempFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::InvalidRequest(e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("text") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ServerError::InvalidRequest(e.to_string()))?;
                text = Some(value);
            }
            Some("image") if upload.is_none() => {
                let has_name = field.file_name().is_some_and(|name| !name.is_empty());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::InvalidRequest(e.to_string()))?;
                if bytes.is_empty() && !has_name {
                    continue;
                }
                upload = Some(store_upload(&state.upload_dir, &bytes).await?);
            }
            other => {
                tracing::debug!(field = ?other, "Ignoring form field");
            }
        }
    }

    let request = RecommendRequest::new(
        text.as_deref(),
        upload.as_ref().map(|file| file.path()),
    );
    let recommendation = state.recommender.recommend(request).await;

    // Dropping the upload here deletes it; early returns above drop it too.
    drop(upload);

    Ok(Html(render_recommendation(&recommendation)))
}

/// The HTTP server instance.
pub struct TravelServer {
    config: ServerConfig,
    recommender: Arc<Recommender>,
}

impl TravelServer {
    /// Create a new server.
    ///
    /// # Arguments
    /// * `config` - Server configuration
    /// * `recommender` - The shared recommendation pipeline
    pub fn new(config: ServerConfig, recommender: Arc<Recommender>) -> Self {
        Self {
            config,
            recommender,
        }
    }

    pub fn router(&self) -> Router {
        create_router(self.recommender.clone(), &self.config)
    }

    /// Bind and serve until the process is stopped.
    ///
    /// # Errors
    /// Returns `ServerError` if the address cannot be bound or serving fails
    pub async fn run(&self) -> ServerResult<()> {
        let addr = self.config.bind_addr()?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::InitializationError(format!("bind {}: {}", addr, e)))?;

        tracing::info!("Travel Bot running at http://{}", addr);
        axum::serve(listener, self.router())
            .await
            .map_err(|e| ServerError::Other(e.to_string()))?;

        Ok(())
    }
}
