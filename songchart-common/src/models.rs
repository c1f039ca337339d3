//! Catalog data model

use serde::{Deserialize, Serialize};

/// Externally assigned song identifier
pub type SongId = i64;

/// One chart entry
///
/// Field names are the wire and on-disk names. All fields are required
/// when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub peak_position: i64,
    pub weeks_on_chart: i64,
}
