//! Mapping of catalog outcomes to HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use songchart_common::Error;
use tracing::error;

/// Song API errors
#[derive(Debug, PartialEq, Eq)]
pub enum ApiError {
    /// No song with the requested id (or the id is not an integer)
    NotFound,
    /// Request body is not a valid song
    InvalidBody,
    /// Request body exceeds the configured limit
    PayloadTooLarge,
    /// Create with an id that is already taken
    DuplicateId,
    /// Update body carries a different id than the path
    IdChange,
    /// Catalog file could not be written; carries the client-facing message
    Storage(&'static str),
}

impl ApiError {
    /// Translate a repository error. `failure_message` is returned to the
    /// client when the catalog could not be written.
    pub fn from_repository(err: Error, failure_message: &'static str) -> Self {
        match err {
            Error::NotFound(_) => ApiError::NotFound,
            Error::DuplicateId(_) => ApiError::DuplicateId,
            Error::IdMismatch { .. } => ApiError::IdChange,
            other => {
                error!("Catalog write failed: {}", other);
                ApiError::Storage(failure_message)
            }
        }
    }

    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Song not found"),
            ApiError::InvalidBody => (StatusCode::BAD_REQUEST, "Invalid song data"),
            ApiError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large"),
            ApiError::DuplicateId => (StatusCode::BAD_REQUEST, "Song with this ID already exists"),
            ApiError::IdChange => (StatusCode::BAD_REQUEST, "Song ID cannot be changed"),
            ApiError::Storage(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(json!({ "error": message }))).into_response()
    }
}
