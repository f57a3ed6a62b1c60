//! Engine that keeps time without producing sound.
//!
//! Used when no output device is available (or wanted): the playhead moves
//! with the wall clock over the track's probed duration.

use std::time::Duration;

use log::debug;

use crate::catalog::Track;
use crate::media::probe_duration;
use crate::tools::timer::Timer;

use super::{track_path, EngineError, PlaybackEngine};

#[derive(Debug, Default)]
pub struct SilentEngine {
    timer: Timer,
    duration: Option<Duration>,
    loaded: bool,
}

impl SilentEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a timed track of a known length, bypassing file probing.
    pub fn load_with_duration(&mut self, duration: Duration) {
        self.timer.reset();
        self.duration = Some(duration);
        self.loaded = true;
        self.timer.start();
    }
}

impl PlaybackEngine for SilentEngine {
    fn load(&mut self, track: &Track) -> Result<(), EngineError> {
        self.stop();
        let path = track_path(track)?;
        let duration = probe_duration(&path).ok_or_else(|| EngineError::Decode {
            path: path.clone(),
            reason: "unable to determine duration".to_string(),
        })?;
        debug!("silent playback of {} ({:?})", path.display(), duration);
        self.load_with_duration(duration);
        Ok(())
    }

    fn pause(&mut self) {
        self.timer.pause();
    }

    fn resume(&mut self) {
        if self.loaded && !self.is_finished() {
            self.timer.un_pause();
        }
    }

    fn seek(&mut self, position: Duration) -> Result<(), EngineError> {
        if !self.loaded {
            return Ok(());
        }
        let target = match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        };
        self.timer.seek(target);
        Ok(())
    }

    fn position(&self) -> Duration {
        let time = self.timer.get_time();
        match self.duration {
            Some(duration) => time.min(duration),
            None => time,
        }
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn is_playing(&self) -> bool {
        self.loaded && self.timer.is_running() && !self.is_finished()
    }

    fn is_finished(&self) -> bool {
        match self.duration {
            Some(duration) => self.loaded && self.timer.get_time() >= duration,
            None => false,
        }
    }

    fn stop(&mut self) {
        self.timer.reset();
        self.duration = None;
        self.loaded = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pause_holds_position() {
        let mut engine = SilentEngine::new();
        engine.load_with_duration(Duration::from_secs(60));
        engine.seek(Duration::from_secs(10)).unwrap();
        engine.pause();
        assert!(!engine.is_playing());
        assert_eq!(engine.position(), Duration::from_secs(10));
        assert_eq!(engine.duration(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn reaches_the_end() {
        let mut engine = SilentEngine::new();
        engine.load_with_duration(Duration::from_millis(5));
        std::thread::sleep(Duration::from_millis(20));
        assert!(engine.is_finished());
        assert!(!engine.is_playing());
        assert_eq!(engine.position(), Duration::from_millis(5));
    }

    #[test]
    fn unprobeable_file_leaves_engine_idle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ogg");
        std::fs::write(&path, b"garbage").unwrap();

        let mut engine = SilentEngine::new();
        let track = Track::new(1, "Broken", "x").with_path(&path);
        assert!(matches!(engine.load(&track), Err(EngineError::Decode { .. })));
        assert!(!engine.is_finished());
        assert!(!engine.is_playing());
    }

    #[test]
    fn track_without_path_is_rejected() {
        let mut engine = SilentEngine::new();
        let track = Track::new(9, "Nowhere", "x");
        assert!(matches!(engine.load(&track), Err(EngineError::MissingPath(9))));
    }
}
