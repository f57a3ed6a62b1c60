//! Engine backed by the default output device through rodio.

use std::fs::File;
use std::io::BufReader;
use std::thread;
use std::time::Duration;

use log::{debug, warn};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::catalog::Track;
use crate::media::probe_duration;

use super::{track_path, EngineError, PlaybackEngine};

const OUTPUT_STREAM_OPEN_RETRIES: usize = 20;
const OUTPUT_STREAM_OPEN_RETRY_MS: u64 = 100;

/// Plays one track at a time into a single sink.
///
/// The output stream must outlive the sink, so both are owned here and the
/// engine stays on the thread that opened it.
pub struct RodioEngine {
    _stream: OutputStream,
    sink: Sink,
    duration: Option<Duration>,
    loaded: bool,
}

impl RodioEngine {
    /// Open the default output device, retrying while it is busy.
    pub fn open() -> Result<Self, EngineError> {
        let mut attempt = 1;
        let stream = loop {
            match OutputStreamBuilder::open_default_stream() {
                Ok(stream) => break stream,
                Err(err) if attempt < OUTPUT_STREAM_OPEN_RETRIES => {
                    warn!(
                        "open_default_stream attempt {}/{} failed: {}",
                        attempt, OUTPUT_STREAM_OPEN_RETRIES, err
                    );
                    attempt += 1;
                    thread::sleep(Duration::from_millis(OUTPUT_STREAM_OPEN_RETRY_MS));
                }
                Err(err) => {
                    return Err(EngineError::Output(format!(
                        "no default output stream after {} attempts: {}",
                        OUTPUT_STREAM_OPEN_RETRIES, err
                    )));
                }
            }
        };

        let sink = Sink::connect_new(stream.mixer());
        sink.pause();

        Ok(Self {
            _stream: stream,
            sink,
            duration: None,
            loaded: false,
        })
    }
}

impl PlaybackEngine for RodioEngine {
    fn load(&mut self, track: &Track) -> Result<(), EngineError> {
        self.stop();

        let path = track_path(track)?;
        let file = File::open(&path).map_err(|source| EngineError::Open {
            path: path.clone(),
            source,
        })?;
        let source = Decoder::new(BufReader::new(file)).map_err(|err| EngineError::Decode {
            path: path.clone(),
            reason: err.to_string(),
        })?;

        self.duration = source.total_duration().or_else(|| probe_duration(&path));
        debug!("loaded {} ({:?})", path.display(), self.duration);

        self.sink.append(source);
        self.sink.play();
        self.loaded = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn resume(&mut self) {
        if self.loaded {
            self.sink.play();
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
        self.sink
            .try_seek(target)
            .map_err(|err| EngineError::Seek(err.to_string()))
    }

    fn position(&self) -> Duration {
        if self.loaded {
            self.sink.get_pos()
        } else {
            Duration::ZERO
        }
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn is_playing(&self) -> bool {
        self.loaded && !self.sink.is_paused() && !self.sink.empty()
    }

    fn is_finished(&self) -> bool {
        self.loaded && self.sink.empty()
    }

    fn stop(&mut self) {
        self.sink.clear();
        self.duration = None;
        self.loaded = false;
    }
}
