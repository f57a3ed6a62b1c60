use thiserror::Error;

/// Rejections returned by session commands.
///
/// Commands that arrive before the session is ready are not errors; they are
/// ignored.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("track index {index} is out of range for a catalog of {len}")]
    InvalidIndex { index: usize, len: usize },

    #[error("lost the connection to the playback worker")]
    ConnectionLost,
}
