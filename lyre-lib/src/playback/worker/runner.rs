//! Worker thread loop.

use std::sync::atomic::AtomicBool;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::playback::output::{EngineError, PlaybackEngine};

use super::guard::ConnectionGuard;
use super::queue::PlayQueue;
use super::{TrackChange, WorkerCommand, WorkerHandle, WorkerListener, WorkerStatus};

pub(super) struct WorkerContext {
    pub(super) handle: WorkerHandle,
    pub(super) commands: Receiver<WorkerCommand>,
    pub(super) listener: Arc<dyn WorkerListener>,
    pub(super) running: Arc<AtomicBool>,
    pub(super) tick: Duration,
}

struct Runner<E> {
    engine: E,
    queue: PlayQueue,
    connection: u64,
    /// Cueing commands applied so far.
    cues: u64,
    listener: Arc<dyn WorkerListener>,
    status: Arc<Mutex<WorkerStatus>>,
}

pub(super) fn run_worker<E, F>(context: WorkerContext, open_engine: F)
where
    E: PlaybackEngine,
    F: FnOnce() -> Result<E, EngineError>,
{
    let WorkerContext {
        handle,
        commands,
        listener,
        running,
        tick,
    } = context;
    let connection = handle.id();
    let _guard = ConnectionGuard::new(running, listener.clone(), connection);

    let engine = match open_engine() {
        Ok(engine) => engine,
        Err(err) => {
            error!("playback worker {} has no engine: {}", connection, err);
            return;
        }
    };

    let mut runner = Runner {
        engine,
        queue: PlayQueue::default(),
        connection,
        cues: 0,
        listener: listener.clone(),
        status: handle.status_cell(),
    };
    runner.publish();

    info!("playback worker {} connected", connection);
    listener.connected(handle);

    loop {
        match commands.recv_timeout(tick) {
            Ok(WorkerCommand::Shutdown) => break,
            Ok(command) => runner.apply(command),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                debug!("playback worker {} lost its command channel", connection);
                break;
            }
        }
        runner.advance_if_finished();
        runner.publish();
    }

    runner.engine.stop();
    runner.publish();
    info!("playback worker {} stopped", connection);
}

impl<E: PlaybackEngine> Runner<E> {
    fn apply(&mut self, command: WorkerCommand) {
        if command.cues_track() {
            self.cues += 1;
        }
        match command {
            WorkerCommand::LoadCatalog(catalog) => {
                self.engine.stop();
                info!("worker received {} tracks", catalog.len());
                self.queue.load(catalog);
            }
            WorkerCommand::PlayAt(index) => {
                self.play(index);
            }
            WorkerCommand::Pause => self.engine.pause(),
            WorkerCommand::Resume => {
                if self.queue.current().is_some() {
                    self.engine.resume();
                }
            }
            WorkerCommand::SeekTo(ms) => {
                if self.queue.current().is_none() {
                    debug!("seek to {}ms ignored, nothing loaded", ms);
                } else if let Err(err) = self.engine.seek(Duration::from_millis(ms)) {
                    warn!("seek to {}ms failed: {}", ms, err);
                }
            }
            WorkerCommand::SetShuffle(shuffle) => self.queue.set_shuffle(shuffle),
            WorkerCommand::Shutdown => {}
        }
    }

    fn play(&mut self, index: usize) {
        let len = self.queue.len();
        let Some(track) = self.queue.select(index).cloned() else {
            warn!("no track at index {} ({} tracks)", index, len);
            return;
        };
        match self.engine.load(&track) {
            Ok(()) => info!("playing {} - {}", track.artist(), track.title()),
            Err(err) => error!("cannot play {}: {}", track.title(), err),
        }
    }

    fn advance_if_finished(&mut self) {
        if self.queue.current().is_none() || !self.engine.is_finished() {
            return;
        }
        let Some(next) = self.queue.next_after_completion() else {
            return;
        };
        debug!("track finished, advancing to {}", next);
        self.play(next);
        self.listener.track_changed(TrackChange {
            connection: self.connection,
            index: next,
            cue: self.cues,
        });
    }

    fn publish(&self) {
        let status = WorkerStatus {
            playing: self.engine.is_playing(),
            position_ms: as_millis(self.engine.position()),
            duration_ms: self.engine.duration().map(as_millis).unwrap_or(0),
            current: self.queue.current(),
            shuffle: self.queue.shuffle(),
            track_count: self.queue.len(),
        };
        *self.status.lock().unwrap() = status;
    }
}

fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
