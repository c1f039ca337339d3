//! Catalog storage
//!
//! - `persistence`: whole-catalog JSON file round trip (no in-memory state)
//! - `repository`: in-memory catalog, id uniqueness, write-through on mutation

pub mod persistence;
pub mod repository;

pub use persistence::SongStore;
pub use repository::SongRepository;
