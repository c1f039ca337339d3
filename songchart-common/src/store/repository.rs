//! In-memory song catalog with write-through persistence
//!
//! The repository owns the ordered catalog and is the only way to read or
//! change it. Every mutation runs under the exclusive lock:
//!
//! 1. Validate against the current catalog
//! 2. Stage the new catalog as a copy
//! 3. Save the staged copy synchronously
//! 4. Commit the staged copy only if the save succeeded
//!
//! Readers therefore never see a catalog that is not on disk, and a failed
//! save leaves memory and file at the pre-mutation state.

use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::{error, info, warn};

use super::persistence::SongStore;
use crate::models::{Song, SongId};
use crate::{Error, Result};

/// Song catalog shared by all request handlers
pub struct SongRepository {
    store: SongStore,
    catalog: RwLock<Vec<Song>>,
}

impl SongRepository {
    /// Load the catalog from `store`
    ///
    /// Fails if an existing catalog file cannot be read or parsed; the
    /// service must not start in that case.
    pub fn open(store: SongStore) -> Result<Self> {
        let songs = store.load()?;
        info!(
            "Loaded {} songs from {}",
            songs.len(),
            store.path().display()
        );
        Ok(Self {
            store,
            catalog: RwLock::new(songs),
        })
    }

    pub fn store(&self) -> &SongStore {
        &self.store
    }

    /// All songs in catalog order
    pub async fn list(&self) -> Vec<Song> {
        self.catalog.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.catalog.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.catalog.read().await.is_empty()
    }

    /// Song with the given id
    pub async fn get(&self, id: SongId) -> Result<Song> {
        let catalog = self.catalog.read().await;
        catalog
            .iter()
            .find(|song| song.id == id)
            .cloned()
            .ok_or(Error::NotFound(id))
    }

    /// Append a new song. Fails with `DuplicateId` if the id is taken.
    pub async fn create(&self, song: Song) -> Result<Song> {
        let mut catalog = self.catalog.write().await;

        if catalog.iter().any(|existing| existing.id == song.id) {
            warn!("Rejected create: song id {} already exists", song.id);
            return Err(Error::DuplicateId(song.id));
        }

        let mut staged = catalog.clone();
        staged.push(song.clone());
        self.commit(&mut catalog, staged)?;

        info!("Created song {} ({})", song.id, song.title);
        Ok(song)
    }

    /// Replace the song with the given id in place
    ///
    /// The record id is immutable: a body whose id differs from `id` is
    /// rejected with `IdMismatch` before anything is changed.
    pub async fn update(&self, id: SongId, song: Song) -> Result<Song> {
        let mut catalog = self.catalog.write().await;

        let index = position(&catalog, id).ok_or(Error::NotFound(id))?;
        if song.id != id {
            warn!("Rejected update of song {}: body carries id {}", id, song.id);
            return Err(Error::IdMismatch {
                path_id: id,
                body_id: song.id,
            });
        }

        let mut staged = catalog.clone();
        staged[index] = song.clone();
        self.commit(&mut catalog, staged)?;

        info!("Updated song {} ({})", song.id, song.title);
        Ok(song)
    }

    /// Remove the song with the given id, returning it
    pub async fn delete(&self, id: SongId) -> Result<Song> {
        let mut catalog = self.catalog.write().await;

        let index = position(&catalog, id).ok_or(Error::NotFound(id))?;

        let mut staged = catalog.clone();
        let removed = staged.remove(index);
        self.commit(&mut catalog, staged)?;

        info!("Deleted song {} ({})", removed.id, removed.title);
        Ok(removed)
    }

    /// Persist `staged` and install it as the catalog.
    ///
    /// Must stay free of `.await`: the save and the swap happen together or
    /// not at all, even if the calling future is dropped.
    fn commit(&self, catalog: &mut RwLockWriteGuard<'_, Vec<Song>>, staged: Vec<Song>) -> Result<()> {
        if let Err(e) = self.store.save(&staged) {
            error!(
                "Failed to save catalog to {}: {} (change rolled back)",
                self.store.path().display(),
                e
            );
            return Err(e);
        }
        **catalog = staged;
        Ok(())
    }
}

fn position(catalog: &[Song], id: SongId) -> Option<usize> {
    catalog.iter().position(|song| song.id == id)
}
