//! Song catalog endpoints
//!
//! | Method | Path                 | Success               |
//! |--------|----------------------|-----------------------|
//! | GET    | `/api/v1/songs`      | 200, array of songs   |
//! | GET    | `/api/v1/songs/:id`  | 200, song             |
//! | POST   | `/api/v1/songs`      | 201, created song     |
//! | PUT    | `/api/v1/songs/:id`  | 200, replacement song |
//! | DELETE | `/api/v1/songs/:id`  | 200, deleted song     |

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use songchart_common::{Song, SongId};
use tracing::debug;

use super::error::ApiError;
use crate::AppState;

const READ_FAILED: &str = "Failed to read song";
const SAVE_FAILED: &str = "Failed to save song";
const DELETE_FAILED: &str = "Failed to delete song";

/// Build song catalog routes
pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/songs", get(list_songs).post(create_song))
        .route(
            "/api/v1/songs/:id",
            get(get_song).put(update_song).delete(delete_song),
        )
}

/// GET /api/v1/songs
pub async fn list_songs(State(state): State<AppState>) -> Json<Vec<Song>> {
    Json(state.repository.list().await)
}

/// GET /api/v1/songs/:id
pub async fn get_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Song>, ApiError> {
    let id = parse_id(&id)?;
    state
        .repository
        .get(id)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_repository(e, READ_FAILED))
}

/// POST /api/v1/songs
pub async fn create_song(
    State(state): State<AppState>,
    payload: Result<Json<Song>, JsonRejection>,
) -> Result<(StatusCode, Json<Song>), ApiError> {
    let Json(song) = payload.map_err(invalid_body)?;
    let created = state
        .repository
        .create(song)
        .await
        .map_err(|e| ApiError::from_repository(e, SAVE_FAILED))?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/v1/songs/:id
///
/// Replaces the whole record. The body id must equal the path id.
pub async fn update_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Song>, JsonRejection>,
) -> Result<Json<Song>, ApiError> {
    let Json(song) = payload.map_err(invalid_body)?;
    let id = parse_id(&id)?;
    state
        .repository
        .update(id, song)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_repository(e, SAVE_FAILED))
}

/// DELETE /api/v1/songs/:id
pub async fn delete_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Song>, ApiError> {
    let id = parse_id(&id)?;
    state
        .repository
        .delete(id)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_repository(e, DELETE_FAILED))
}

/// A path id that is not an integer cannot name any song
fn parse_id(raw: &str) -> Result<SongId, ApiError> {
    raw.parse().map_err(|_| {
        debug!("Non-integer song id in path: {:?}", raw);
        ApiError::NotFound
    })
}

fn invalid_body(rejection: JsonRejection) -> ApiError {
    debug!("Rejected song payload: {}", rejection.body_text());
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::InvalidBody
    }
}
