//! Decode/output engines driven by the playback worker.
//!
//! The worker only talks to the [`PlaybackEngine`] trait. Engines are opened
//! on the worker thread itself, so they do not need to be `Send`.

#[cfg(feature = "rodio-output")]
mod rodio_engine;
mod silent;

use std::path::PathBuf;
use std::time::Duration;

use log::warn;
use thiserror::Error;

use crate::catalog::Track;

#[cfg(feature = "rodio-output")]
pub use rodio_engine::RodioEngine;
pub use silent::SilentEngine;

/// Failures reported by an engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to open audio output: {0}")]
    Output(String),

    #[error("track {0} has no file path")]
    MissingPath(i64),

    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("seek failed: {0}")]
    Seek(String),
}

/// The capability that actually turns a track into sound.
///
/// `is_finished` must only report `true` for a track that was loaded
/// successfully and then played to its end; a failed load leaves the engine
/// idle.
pub trait PlaybackEngine {
    /// Stop whatever is playing and start `track` from the beginning.
    fn load(&mut self, track: &Track) -> Result<(), EngineError>;

    fn pause(&mut self);

    fn resume(&mut self);

    fn seek(&mut self, position: Duration) -> Result<(), EngineError>;

    /// Playhead of the loaded track; the paused position while paused.
    fn position(&self) -> Duration;

    /// Length of the loaded track, when known.
    fn duration(&self) -> Option<Duration>;

    fn is_playing(&self) -> bool;

    fn is_finished(&self) -> bool;

    /// Unload the current track.
    fn stop(&mut self);
}

impl<E: PlaybackEngine + ?Sized> PlaybackEngine for Box<E> {
    fn load(&mut self, track: &Track) -> Result<(), EngineError> {
        (**self).load(track)
    }

    fn pause(&mut self) {
        (**self).pause();
    }

    fn resume(&mut self) {
        (**self).resume();
    }

    fn seek(&mut self, position: Duration) -> Result<(), EngineError> {
        (**self).seek(position)
    }

    fn position(&self) -> Duration {
        (**self).position()
    }

    fn duration(&self) -> Option<Duration> {
        (**self).duration()
    }

    fn is_playing(&self) -> bool {
        (**self).is_playing()
    }

    fn is_finished(&self) -> bool {
        (**self).is_finished()
    }

    fn stop(&mut self) {
        (**self).stop();
    }
}

/// Open an engine with `open`, keeping time with a [`SilentEngine`] when the
/// output cannot be started.
pub fn open_or_silent<E, F>(open: F) -> Result<Box<dyn PlaybackEngine>, EngineError>
where
    E: PlaybackEngine + 'static,
    F: FnOnce() -> Result<E, EngineError>,
{
    match open() {
        Ok(engine) => Ok(Box::new(engine)),
        Err(err) => {
            warn!("{}; playing silently instead", err);
            Ok(Box::new(SilentEngine::new()))
        }
    }
}

pub(crate) fn track_path(track: &Track) -> Result<PathBuf, EngineError> {
    track
        .path()
        .map(|path| path.to_path_buf())
        .ok_or(EngineError::MissingPath(track.id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_output_falls_back_to_silence() {
        let mut engine = open_or_silent(|| -> Result<SilentEngine, EngineError> {
            Err(EngineError::Output("no device".to_string()))
        })
        .unwrap();
        assert!(!engine.is_playing());
        assert!(!engine.is_finished());
        assert_eq!(engine.duration(), None);
        engine.stop();
    }
}
