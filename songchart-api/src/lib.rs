//! songchart-api library - REST interface for the song catalog
//!
//! Routes `/api/v1/songs` requests to the `SongRepository` and maps its
//! outcomes to HTTP status codes and JSON bodies.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use songchart_common::config::DEFAULT_MAX_BODY_BYTES;
use songchart_common::SongRepository;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Song catalog
    pub repository: Arc<SongRepository>,
    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
}

impl AppState {
    /// Create new application state with the default body limit
    pub fn new(repository: Arc<SongRepository>) -> Self {
        Self {
            repository,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_body_bytes);

    Router::new()
        .merge(api::song_routes())
        .merge(api::health_routes())
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
