//! JSON file persistence for the song catalog
//!
//! The catalog is stored as a single pretty-printed document:
//!
//! ```json
//! {
//!   "songs": [
//!     { "id": 1, "title": "...", "artist": "...", "genre": "...",
//!       "peak_position": 1, "weeks_on_chart": 12 }
//!   ]
//! }
//! ```
//!
//! Saves go through a sibling temp file that is fsynced and renamed over the
//! target, so the target always holds either the previous or the new catalog.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::Song;
use crate::{Error, Result};

/// On-disk document, write side
#[derive(Serialize)]
struct CatalogFileRef<'a> {
    songs: &'a [Song],
}

/// On-disk document, read side. A missing or null `songs` key is an empty catalog.
#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    songs: Option<Vec<Song>>,
}

/// Reads and writes the full catalog at one file path
#[derive(Debug, Clone)]
pub struct SongStore {
    path: PathBuf,
}

impl SongStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Catalog file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the directory holding the catalog file if it does not exist yet
    pub fn ensure_parent_dir(&self) -> Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
                info!("Creating data directory: {}", parent.display());
                fs::create_dir_all(parent)?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Load the catalog
    ///
    /// - Missing file: empty catalog (first run)
    /// - Empty file, `{}` or `"songs": null`: empty catalog
    /// - Malformed document or duplicate ids: `Error::CorruptStorage`
    pub fn load(&self) -> Result<Vec<Song>> {
        self.remove_stale_temp();

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(
                    "Catalog file {} does not exist, starting with an empty catalog",
                    self.path.display()
                );
                return Ok(Vec::new());
            }
            Err(e) => return Err(Error::Io(e)),
        };

        if content.trim().is_empty() {
            warn!("Catalog file {} is empty, treating as empty catalog", self.path.display());
            return Ok(Vec::new());
        }

        let document: CatalogFile =
            serde_json::from_str(&content).map_err(|e| self.corrupt(e.to_string()))?;
        let songs = document.songs.unwrap_or_default();

        let mut seen = HashSet::with_capacity(songs.len());
        for song in &songs {
            if !seen.insert(song.id) {
                return Err(self.corrupt(format!("duplicate song id {}", song.id)));
            }
        }

        debug!("Loaded {} songs from {}", songs.len(), self.path.display());
        Ok(songs)
    }

    /// Write the full catalog, replacing the previous file atomically
    pub fn save(&self, songs: &[Song]) -> Result<()> {
        let data = serde_json::to_string_pretty(&CatalogFileRef { songs })?;
        let temp_path = self.temp_path();

        if let Err(e) = write_synced(&temp_path, data.as_bytes()) {
            let _ = fs::remove_file(&temp_path);
            return Err(Error::Persistence(e));
        }

        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(Error::Persistence(e));
        }

        self.sync_parent_dir();
        debug!("Saved {} songs to {}", songs.len(), self.path.display());
        Ok(())
    }

    /// `<file name>.tmp` next to the catalog file
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("songs.json"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Leftover from a save that was interrupted before its rename
    fn remove_stale_temp(&self) {
        let temp_path = self.temp_path();
        if temp_path.is_file() {
            warn!(
                "Removing incomplete catalog write {} left by an interrupted save",
                temp_path.display()
            );
            if let Err(e) = fs::remove_file(&temp_path) {
                warn!("Failed to remove {}: {}", temp_path.display(), e);
            }
        }
    }

    /// Make the rename itself durable. The new file is already in place at
    /// this point, so a failure is only logged.
    #[cfg(unix)]
    fn sync_parent_dir(&self) {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if let Err(e) = File::open(parent).and_then(|dir| dir.sync_all()) {
            warn!("Failed to sync directory {}: {}", parent.display(), e);
        }
    }

    #[cfg(not(unix))]
    fn sync_parent_dir(&self) {}

    fn corrupt(&self, reason: String) -> Error {
        Error::CorruptStorage {
            path: self.path.clone(),
            reason,
        }
    }
}

fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}
