//! Integration tests for songchart-api endpoints
//!
//! Tests cover:
//! - GET/POST/PUT/DELETE on /api/v1/songs with exact status codes and bodies
//! - Invalid payload, duplicate id and id change handling
//! - Catalog file contents after each mutation
//! - 500 responses and unchanged catalog when the file cannot be written
//! - Health and build info endpoints

use std::fs;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use songchart_api::{build_router, AppState};
use songchart_common::{SongRepository, SongStore};
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: app over a fresh catalog file in `dir`
fn setup_app(dir: &TempDir) -> Router {
    let store = SongStore::new(dir.path().join("songs.json"));
    let repository = SongRepository::open(store).expect("Should open repository");
    build_router(AppState::new(Arc::new(repository)))
}

/// Test helper: request without body
fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: request with JSON body
fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Test helper: send one request and return status and JSON body
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

fn song_json(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "artist": "Queen",
        "genre": "Rock",
        "peak_position": 2,
        "weeks_on_chart": 17
    })
}

fn catalog_file(dir: &TempDir) -> Value {
    let content = fs::read_to_string(dir.path().join("songs.json")).expect("Should read catalog");
    serde_json::from_str(&content).expect("Catalog should be JSON")
}

// =============================================================================
// Listing and lookup
// =============================================================================

#[tokio::test]
async fn test_list_empty_catalog() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir);

    let (status, body) = send(&app, test_request("GET", "/api/v1/songs")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_list_serves_songs_loaded_at_startup() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("songs.json"),
        json!({ "songs": [song_json(2, "Two"), song_json(1, "One")] }).to_string(),
    )
    .unwrap();
    let app = setup_app(&dir);

    let (status, body) = send(&app, test_request("GET", "/api/v1/songs")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([song_json(2, "Two"), song_json(1, "One")]));
}

#[tokio::test]
async fn test_get_missing_song_is_404() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir);

    let (status, body) = send(&app, test_request("GET", "/api/v1/songs/99")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Song not found" }));
}

#[tokio::test]
async fn test_get_non_integer_id_is_404() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir);

    let (status, body) = send(&app, test_request("GET", "/api/v1/songs/abc")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Song not found" }));
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_returns_201_and_persists() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir);

    let (status, body) = send(
        &app,
        json_request("POST", "/api/v1/songs", &song_json(1, "Bohemian Rhapsody")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, song_json(1, "Bohemian Rhapsody"));
    assert_eq!(
        catalog_file(&dir),
        json!({ "songs": [song_json(1, "Bohemian Rhapsody")] })
    );

    let (status, body) = send(&app, test_request("GET", "/api/v1/songs/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, song_json(1, "Bohemian Rhapsody"));
}

#[tokio::test]
async fn test_create_duplicate_id_is_400() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir);
    send(&app, json_request("POST", "/api/v1/songs", &song_json(1, "First"))).await;

    let (status, body) =
        send(&app, json_request("POST", "/api/v1/songs", &song_json(1, "Second"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Song with this ID already exists" }));

    let (_, list) = send(&app, test_request("GET", "/api/v1/songs")).await;
    assert_eq!(list, json!([song_json(1, "First")]));
}

#[tokio::test]
async fn test_create_invalid_body_is_400() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir);

    let malformed = Request::builder()
        .method("POST")
        .uri("/api/v1/songs")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"id\": 1, \"title\": "))
        .unwrap();
    let (status, body) = send(&app, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid song data" }));

    let missing_field = json!({ "id": 1, "title": "No artist" });
    let (status, body) = send(&app, json_request("POST", "/api/v1/songs", &missing_field)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid song data" }));

    let no_content_type = Request::builder()
        .method("POST")
        .uri("/api/v1/songs")
        .body(Body::from(song_json(1, "A").to_string()))
        .unwrap();
    let (status, body) = send(&app, no_content_type).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid song data" }));

    assert!(!dir.path().join("songs.json").exists());
}

#[tokio::test]
async fn test_create_oversized_body_is_413() {
    let dir = TempDir::new().unwrap();
    let store = SongStore::new(dir.path().join("songs.json"));
    let repository = SongRepository::open(store).unwrap();
    let app = build_router(AppState::new(Arc::new(repository)).with_max_body_bytes(64));

    let mut song = song_json(1, "Long");
    song["title"] = json!("x".repeat(256));
    let (status, body) = send(&app, json_request("POST", "/api/v1/songs", &song)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, json!({ "error": "Request body too large" }));
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn test_update_replaces_song() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir);
    send(&app, json_request("POST", "/api/v1/songs", &song_json(1, "A"))).await;

    let (status, body) =
        send(&app, json_request("PUT", "/api/v1/songs/1", &song_json(1, "B"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, song_json(1, "B"));
    assert_eq!(catalog_file(&dir), json!({ "songs": [song_json(1, "B")] }));
}

#[tokio::test]
async fn test_update_missing_song_is_404() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir);

    let (status, body) =
        send(&app, json_request("PUT", "/api/v1/songs/5", &song_json(5, "Ghost"))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Song not found" }));
}

#[tokio::test]
async fn test_update_invalid_body_is_400() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir);
    send(&app, json_request("POST", "/api/v1/songs", &song_json(1, "A"))).await;

    let bad = json!({ "id": 1, "title": 5 });
    let (status, body) = send(&app, json_request("PUT", "/api/v1/songs/1", &bad)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid song data" }));
}

#[tokio::test]
async fn test_update_with_different_body_id_is_400() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir);
    send(&app, json_request("POST", "/api/v1/songs", &song_json(1, "A"))).await;

    let (status, body) =
        send(&app, json_request("PUT", "/api/v1/songs/1", &song_json(2, "Moved"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Song ID cannot be changed" }));

    let (_, song) = send(&app, test_request("GET", "/api/v1/songs/1")).await;
    assert_eq!(song, song_json(1, "A"));
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_returns_removed_song() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir);
    for (id, title) in [(1, "A"), (2, "B"), (3, "C")] {
        send(&app, json_request("POST", "/api/v1/songs", &song_json(id, title))).await;
    }

    let (status, body) = send(&app, test_request("DELETE", "/api/v1/songs/2")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, song_json(2, "B"));

    let (_, list) = send(&app, test_request("GET", "/api/v1/songs")).await;
    assert_eq!(list, json!([song_json(1, "A"), song_json(3, "C")]));
    assert_eq!(
        catalog_file(&dir),
        json!({ "songs": [song_json(1, "A"), song_json(3, "C")] })
    );
}

#[tokio::test]
async fn test_delete_missing_song_is_404() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir);

    let (status, body) = send(&app, test_request("DELETE", "/api/v1/songs/1")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Song not found" }));
}

// =============================================================================
// Persistence failures
// =============================================================================

#[tokio::test]
async fn test_write_failure_is_500_and_catalog_unchanged() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir);
    send(&app, json_request("POST", "/api/v1/songs", &song_json(1, "A"))).await;

    // A directory where the temp file must go makes every save fail
    fs::create_dir(dir.path().join("songs.json.tmp")).unwrap();

    let (status, body) =
        send(&app, json_request("POST", "/api/v1/songs", &song_json(2, "B"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to save song" }));

    let (status, body) =
        send(&app, json_request("PUT", "/api/v1/songs/1", &song_json(1, "Z"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to save song" }));

    let (status, body) = send(&app, test_request("DELETE", "/api/v1/songs/1")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to delete song" }));

    let (_, list) = send(&app, test_request("GET", "/api/v1/songs")).await;
    assert_eq!(list, json!([song_json(1, "A")]));
    assert_eq!(catalog_file(&dir), json!({ "songs": [song_json(1, "A")] }));
}

// =============================================================================
// End-to-end
// =============================================================================

#[tokio::test]
async fn test_end_to_end_scenario() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir);

    let (status, _) = send(&app, json_request("POST", "/api/v1/songs", &song_json(1, "A"))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, list) = send(&app, test_request("GET", "/api/v1/songs")).await;
    assert_eq!(list, json!([song_json(1, "A")]));

    let (status, _) = send(&app, json_request("PUT", "/api/v1/songs/1", &song_json(1, "B"))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, song) = send(&app, test_request("GET", "/api/v1/songs/1")).await;
    assert_eq!(song["title"], "B");

    let (status, _) = send(&app, test_request("DELETE", "/api/v1/songs/1")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, test_request("GET", "/api/v1/songs/1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = send(&app, test_request("GET", "/api/v1/songs")).await;
    assert_eq!(list, json!([]));

    // A restarted service sees the same (empty) catalog
    let restarted = setup_app(&dir);
    let (_, list) = send(&restarted, test_request("GET", "/api/v1/songs")).await;
    assert_eq!(list, json!([]));
}

// =============================================================================
// Health and build info
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir);

    let (status, body) = send(&app, test_request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "songchart-api");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_build_info_endpoint() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir);

    let (status, body) = send(&app, test_request("GET", "/api/v1/buildinfo")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["version"].is_string());
    assert!(body["git_hash"].is_string());
    assert!(body["build_timestamp"].is_string());
    assert!(body["build_profile"].is_string());
}
