use std::path::PathBuf;

use thiserror::Error;

/// Failures of the storage query behind a library scan.
///
/// A scan never surfaces these to the session: they are logged and the scan
/// delivers an empty library instead.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("library root not found: {0}")]
    RootNotFound(PathBuf),

    #[error("library root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}
