//! HTTP API handlers for songchart-api

pub mod buildinfo;
pub mod error;
pub mod health;
pub mod songs;

pub use buildinfo::get_build_info;
pub use error::ApiError;
pub use health::health_routes;
pub use songs::{create_song, delete_song, get_song, list_songs, song_routes, update_song};
