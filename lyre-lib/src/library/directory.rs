//! Filesystem-backed track source.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::catalog::{Track, UNKNOWN_ARTIST};
use crate::media::read_tags;
use crate::settings::LibrarySettings;

use super::{LibraryError, TrackSource};

/// Extensions treated as audio when no explicit list is configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "wav", "m4a", "aac", "aiff", "opus"];

/// Enumerates audio files below a root directory.
///
/// Ids are handed out in walk order (directories sorted by file name), so they
/// are stable while the directory contents do not change.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    extensions: Vec<String>,
    follow_links: bool,
    include_hidden: bool,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            follow_links: false,
            include_hidden: false,
        }
    }

    /// Build a source from library settings rooted at `root`.
    pub fn from_settings(root: impl Into<PathBuf>, settings: &LibrarySettings) -> Self {
        Self::new(root)
            .with_extensions(settings.extensions.iter().cloned())
            .follow_links(settings.follow_links)
            .include_hidden(settings.include_hidden)
    }

    /// Replace the accepted extensions (compared case-insensitively).
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|ext| ext.into().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_audio(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                self.extensions.iter().any(|accepted| *accepted == ext)
            })
            .unwrap_or(false)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    // The root itself is never filtered, temp directories are often dotted.
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

/// Build a track from a file, falling back to the file stem for the title.
fn track_from_file(id: i64, path: &Path) -> Track {
    let tags = read_tags(path);
    let title = tags.title.unwrap_or_else(|| {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    let artist = tags.artist.unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

    Track::new(id, title, artist).with_path(path)
}

impl TrackSource for DirectorySource {
    fn query(&mut self) -> Result<Vec<Track>, LibraryError> {
        if !self.root.exists() {
            return Err(LibraryError::RootNotFound(self.root.clone()));
        }
        if !self.root.is_dir() {
            return Err(LibraryError::NotADirectory(self.root.clone()));
        }

        let include_hidden = self.include_hidden;
        let walker = WalkDir::new(&self.root)
            .follow_links(self.follow_links)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| include_hidden || !is_hidden(entry));

        let mut tracks = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(LibraryError::Walk {
                        path: self.root.clone(),
                        source: err,
                    });
                }
                Err(err) => {
                    warn!("skipping unreadable library entry: {}", err);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.is_audio(entry.path()) {
                continue;
            }

            let id = tracks.len() as i64 + 1;
            tracks.push(track_from_file(id, entry.path()));
        }

        debug!("found {} track(s) under {}", tracks.len(), self.root.display());
        Ok(tracks)
    }
}
