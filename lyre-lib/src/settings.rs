//! Runtime configuration for the scanner and the playback worker.
//!
//! Every field has a default, so a settings file only needs the values it
//! changes.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::library::DEFAULT_EXTENSIONS;

/// Errors raised while loading a settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub worker: WorkerSettings,
}

/// Where and how the library scan looks for tracks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    pub root: Option<PathBuf>,
    pub extensions: Vec<String>,
    pub follow_links: bool,
    pub include_hidden: bool,
}

/// Timing of the playback worker and the transport reporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// How often the worker wakes without a command to refresh its status
    /// and detect finished tracks.
    pub tick_ms: u64,
    /// Interval between transport reports sent to the UI.
    pub report_interval_ms: u64,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            root: None,
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            follow_links: false,
            include_hidden: false,
        }
    }
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            report_interval_ms: 250,
        }
    }
}

impl WorkerSettings {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms.max(1))
    }
}

impl Settings {
    /// Parse settings from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Pretty JSON rendering, used to print the defaults.
    pub fn to_json_pretty(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let settings =
            Settings::from_json_str(r#"{ "worker": { "tick_ms": 10 }, "library": { "root": "/music" } }"#)
                .unwrap();
        assert_eq!(settings.worker.tick_ms, 10);
        assert_eq!(settings.worker.report_interval_ms, 250);
        assert_eq!(settings.library.root, Some(PathBuf::from("/music")));
        assert!(settings.library.extensions.iter().any(|ext| ext == "flac"));
    }

    #[test]
    fn zero_intervals_are_clamped() {
        let worker = WorkerSettings {
            tick_ms: 0,
            report_interval_ms: 0,
        };
        assert_eq!(worker.tick(), Duration::from_millis(1));
        assert_eq!(worker.report_interval(), Duration::from_millis(1));
    }

    #[test]
    fn defaults_round_trip_through_json() {
        let json = Settings::default().to_json_pretty().unwrap();
        assert_eq!(Settings::from_json_str(&json).unwrap(), Settings::default());
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            Settings::from_json_str("{ not json"),
            Err(SettingsError::Json(_))
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Settings::load(&dir.path().join("settings.json")),
            Err(SettingsError::Io { .. })
        ));
    }
}
