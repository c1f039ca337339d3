//! Common error types for songchart

use std::path::PathBuf;

use thiserror::Error;

use crate::models::SongId;

/// Common result type for songchart operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types shared by the catalog core and the service
#[derive(Error, Debug)]
pub enum Error {
    /// No song with this id in the catalog
    #[error("Song not found: {0}")]
    NotFound(SongId),

    /// A song with this id already exists
    #[error("Song with id {0} already exists")]
    DuplicateId(SongId),

    /// Update body tried to change the record id
    #[error("Song id {body_id} does not match path id {path_id}")]
    IdMismatch { path_id: SongId, body_id: SongId },

    /// Existing catalog file could not be understood
    #[error("Corrupt catalog file {}: {reason}", path.display())]
    CorruptStorage { path: PathBuf, reason: String },

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing the catalog file failed; the in-memory catalog was left unchanged
    #[error("Failed to persist catalog: {0}")]
    Persistence(#[source] std::io::Error),

    /// Catalog could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for failures to write the catalog during a mutation
    pub fn is_persistence_failure(&self) -> bool {
        matches!(self, Error::Persistence(_) | Error::Serialization(_))
    }
}
