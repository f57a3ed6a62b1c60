//! Track values and the title-ordered catalog built from a library scan.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Artist label used when storage has no artist for a track.
pub const UNKNOWN_ARTIST: &str = "<unknown>";

/// A single audio file known to the library.
///
/// Tracks are immutable once built. The `id` is only stable for the lifetime
/// of one scan; storage may hand out the same id to a different file later.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    id: i64,
    title: String,
    artist: String,
    path: Option<PathBuf>,
}

impl Track {
    /// Create a track with no backing file path.
    pub fn new(id: i64, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            artist: artist.into(),
            path: None,
        }
    }

    /// Attach the file the track is read from.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Sort tracks ascending by title.
///
/// The comparison is a plain case-sensitive lexical compare and the sort is
/// stable, so tracks sharing a title keep their scan order.
pub fn sort_by_title(tracks: &mut [Track]) {
    tracks.sort_by(|a, b| a.title.cmp(&b.title));
}

/// Title-ordered, immutable list of tracks available for playback.
///
/// Cloning is cheap: the tracks live behind a shared slice, which is what gets
/// handed to the playback worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    tracks: Arc<[Track]>,
}

impl Catalog {
    /// Build a catalog from an unordered scan result.
    pub fn from_scan(tracks: impl IntoIterator<Item = Track>) -> Self {
        let mut tracks: Vec<Track> = tracks.into_iter().collect();
        sort_by_title(&mut tracks);
        Self {
            tracks: tracks.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    /// Catalog index of the track with the given id, if present.
    pub fn position_of(&self, id: i64) -> Option<usize> {
        self.tracks.iter().position(|track| track.id == id)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::from_scan(Vec::new())
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Track;
    type IntoIter = std::slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
