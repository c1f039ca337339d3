//! # Songchart Common Library
//!
//! Shared code for the songchart service:
//! - Song data model
//! - Error types
//! - Configuration loading
//! - Catalog storage (JSON file persistence and the in-memory repository)

pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use error::{Error, Result};
pub use models::{Song, SongId};
pub use store::{SongRepository, SongStore};
