//! Background playback worker.
//!
//! The worker owns a [`PlaybackEngine`] on its own thread and takes
//! [`WorkerCommand`]s over a channel. Its state is published into a shared
//! [`WorkerStatus`] snapshot that readers poll without a round trip.
//!
//! A [`WorkerListener`] hears about the connection coming up, the worker
//! moving to another track on its own, and the connection going away.

mod guard;
mod queue;
mod runner;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use log::warn;
use thiserror::Error;

use crate::catalog::Catalog;
use crate::settings::WorkerSettings;

use super::output::{EngineError, PlaybackEngine};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Requests accepted by the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerCommand {
    /// Replace the worker's catalog. Stops whatever is playing.
    LoadCatalog(Catalog),
    /// Start the track at this catalog index from the beginning.
    PlayAt(usize),
    Pause,
    Resume,
    /// Move the playhead, in milliseconds.
    SeekTo(u64),
    SetShuffle(bool),
    Shutdown,
}

impl WorkerCommand {
    /// Whether the command replaces the track the worker is on.
    pub fn cues_track(&self) -> bool {
        matches!(self, Self::LoadCatalog(_) | Self::PlayAt(_))
    }
}

/// Last published state of the worker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerStatus {
    pub playing: bool,
    pub position_ms: u64,
    pub duration_ms: u64,
    /// Catalog index of the loaded track.
    pub current: Option<usize>,
    pub shuffle: bool,
    pub track_count: usize,
}

/// The worker started another track on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackChange {
    pub connection: u64,
    pub index: usize,
    /// Cueing commands the worker had applied when it moved on. An event
    /// whose count is behind [`WorkerHandle::cues_sent`] was overtaken by a
    /// newer `LoadCatalog` or `PlayAt`.
    pub cue: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkerError {
    #[error("playback worker is disconnected")]
    Disconnected,
}

/// Cloneable connection to a running worker.
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    id: u64,
    commands: Sender<WorkerCommand>,
    status: Arc<Mutex<WorkerStatus>>,
    cues: Arc<AtomicU64>,
}

impl WorkerHandle {
    /// Create a handle with a fresh connection id and the receiving end of its
    /// command channel.
    pub fn channel() -> (Self, Receiver<WorkerCommand>) {
        let (commands, receiver) = mpsc::channel();
        let handle = Self {
            id: NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
            commands,
            status: Arc::new(Mutex::new(WorkerStatus::default())),
            cues: Arc::new(AtomicU64::new(0)),
        };
        (handle, receiver)
    }

    /// Connection id, unique for the life of the process.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn send(&self, command: WorkerCommand) -> Result<(), WorkerError> {
        if command.cues_track() {
            self.cues.fetch_add(1, Ordering::SeqCst);
        }
        self.commands
            .send(command)
            .map_err(|_| WorkerError::Disconnected)
    }

    /// Number of `LoadCatalog` and `PlayAt` commands sent so far.
    pub fn cues_sent(&self) -> u64 {
        self.cues.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> WorkerStatus {
        self.status.lock().unwrap().clone()
    }

    /// Publish a new status snapshot.
    pub fn update_status(&self, update: impl FnOnce(&mut WorkerStatus)) {
        let mut status = self.status.lock().unwrap();
        update(&mut status);
    }

    pub(crate) fn status_cell(&self) -> Arc<Mutex<WorkerStatus>> {
        self.status.clone()
    }
}

/// Receives connection lifecycle events from a worker.
///
/// Callbacks run on the worker thread.
pub trait WorkerListener: Send + Sync + 'static {
    /// The worker is up and accepting commands through `handle`.
    fn connected(&self, handle: WorkerHandle);

    /// The worker started another track on its own after the previous one
    /// ended.
    fn track_changed(&self, _change: TrackChange) {}

    /// The worker with this connection id has stopped.
    fn disconnected(&self, connection: u64);
}

/// Owner of a worker thread.
///
/// Dropping it shuts the worker down and waits for the thread.
pub struct PlaybackWorker {
    handle: WorkerHandle,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl PlaybackWorker {
    /// Start a worker whose engine is built by `open_engine` on the worker
    /// thread. If the engine cannot be opened the worker reports a
    /// disconnect without ever connecting.
    pub fn spawn<E, F>(
        settings: &WorkerSettings,
        open_engine: F,
        listener: Arc<dyn WorkerListener>,
    ) -> Self
    where
        E: PlaybackEngine + 'static,
        F: FnOnce() -> Result<E, EngineError> + Send + 'static,
    {
        let (handle, commands) = WorkerHandle::channel();
        let running = Arc::new(AtomicBool::new(true));
        let context = runner::WorkerContext {
            handle: handle.clone(),
            commands,
            listener,
            running: running.clone(),
            tick: settings.tick(),
        };

        let thread = thread::Builder::new()
            .name(format!("lyre-worker-{}", handle.id()))
            .spawn(move || runner::run_worker(context, open_engine));
        let thread = match thread {
            Ok(thread) => Some(thread),
            Err(err) => {
                warn!("failed to spawn playback worker: {}", err);
                running.store(false, Ordering::SeqCst);
                None
            }
        };

        Self {
            handle,
            running,
            thread,
        }
    }

    pub fn handle(&self) -> &WorkerHandle {
        &self.handle
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Ask the worker to stop and wait for it.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        // Already gone if the send fails; the join still reaps the thread.
        let _ = self.handle.send(WorkerCommand::Shutdown);
        if thread.join().is_err() {
            warn!("playback worker {} panicked", self.handle.id());
        }
    }
}

impl Drop for PlaybackWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::catalog::Track;

    #[derive(Default)]
    struct FakeState {
        loads: Vec<String>,
        playing: bool,
        finished: bool,
        position: Duration,
    }

    struct FakeEngine(Arc<Mutex<FakeState>>);

    impl PlaybackEngine for FakeEngine {
        fn load(&mut self, track: &Track) -> Result<(), EngineError> {
            let mut state = self.0.lock().unwrap();
            state.loads.push(track.title().to_string());
            state.playing = true;
            state.finished = false;
            state.position = Duration::ZERO;
            Ok(())
        }

        fn pause(&mut self) {
            self.0.lock().unwrap().playing = false;
        }

        fn resume(&mut self) {
            self.0.lock().unwrap().playing = true;
        }

        fn seek(&mut self, position: Duration) -> Result<(), EngineError> {
            self.0.lock().unwrap().position = position;
            Ok(())
        }

        fn position(&self) -> Duration {
            self.0.lock().unwrap().position
        }

        fn duration(&self) -> Option<Duration> {
            let state = self.0.lock().unwrap();
            (!state.loads.is_empty()).then(|| Duration::from_secs(60))
        }

        fn is_playing(&self) -> bool {
            let state = self.0.lock().unwrap();
            state.playing && !state.finished
        }

        fn is_finished(&self) -> bool {
            self.0.lock().unwrap().finished
        }

        fn stop(&mut self) {
            let mut state = self.0.lock().unwrap();
            state.playing = false;
            state.finished = false;
        }
    }

    enum Event {
        Connected(WorkerHandle),
        TrackChanged(TrackChange),
        Disconnected(u64),
    }

    struct Recorder(Mutex<Sender<Event>>);

    impl WorkerListener for Recorder {
        fn connected(&self, handle: WorkerHandle) {
            let _ = self.0.lock().unwrap().send(Event::Connected(handle));
        }

        fn track_changed(&self, change: TrackChange) {
            let _ = self.0.lock().unwrap().send(Event::TrackChanged(change));
        }

        fn disconnected(&self, connection: u64) {
            let _ = self.0.lock().unwrap().send(Event::Disconnected(connection));
        }
    }

    fn settings() -> WorkerSettings {
        WorkerSettings {
            tick_ms: 2,
            ..WorkerSettings::default()
        }
    }

    fn catalog() -> Catalog {
        Catalog::from_scan(vec![Track::new(1, "Alpha", "A"), Track::new(2, "Bravo", "B")])
    }

    fn spawn_fake() -> (PlaybackWorker, Arc<Mutex<FakeState>>, Receiver<Event>) {
        let state = Arc::new(Mutex::new(FakeState::default()));
        let (events, receiver) = mpsc::channel();
        let engine_state = state.clone();
        let worker = PlaybackWorker::spawn(
            &settings(),
            move || -> Result<FakeEngine, EngineError> { Ok(FakeEngine(engine_state)) },
            Arc::new(Recorder(Mutex::new(events))),
        );
        (worker, state, receiver)
    }

    fn next_event(events: &Receiver<Event>) -> Event {
        events
            .recv_timeout(Duration::from_secs(2))
            .expect("worker event")
    }

    fn connected(events: &Receiver<Event>) -> WorkerHandle {
        match next_event(events) {
            Event::Connected(handle) => handle,
            _ => panic!("expected the worker to connect first"),
        }
    }

    fn wait_until(handle: &WorkerHandle, check: impl Fn(&WorkerStatus) -> bool) -> WorkerStatus {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            let status = handle.status();
            if check(&status) {
                return status;
            }
            assert!(Instant::now() < deadline, "timed out at {:?}", status);
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn plays_pauses_and_seeks_on_command() {
        let (worker, state, events) = spawn_fake();
        let handle = connected(&events);
        assert_eq!(handle.id(), worker.handle().id());

        handle.send(WorkerCommand::LoadCatalog(catalog())).unwrap();
        handle.send(WorkerCommand::PlayAt(1)).unwrap();
        let status = wait_until(&handle, |s| s.current == Some(1) && s.playing);
        assert_eq!(status.track_count, 2);
        assert_eq!(status.duration_ms, 60_000);
        assert_eq!(state.lock().unwrap().loads, vec!["Bravo".to_string()]);

        handle.send(WorkerCommand::Pause).unwrap();
        wait_until(&handle, |s| !s.playing);
        handle.send(WorkerCommand::SeekTo(12_000)).unwrap();
        wait_until(&handle, |s| s.position_ms == 12_000 && !s.playing);
        handle.send(WorkerCommand::Resume).unwrap();
        wait_until(&handle, |s| s.playing);
    }

    #[test]
    fn advances_when_a_track_ends() {
        let (_worker, state, events) = spawn_fake();
        let handle = connected(&events);
        handle.send(WorkerCommand::LoadCatalog(catalog())).unwrap();
        handle.send(WorkerCommand::PlayAt(1)).unwrap();
        wait_until(&handle, |s| s.current == Some(1) && s.playing);

        state.lock().unwrap().finished = true;
        match next_event(&events) {
            Event::TrackChanged(change) => {
                assert_eq!(change.connection, handle.id());
                assert_eq!(change.index, 0);
                assert_eq!(change.cue, 2);
                assert_eq!(change.cue, handle.cues_sent());
            }
            _ => panic!("expected a track change"),
        }
        wait_until(&handle, |s| s.current == Some(0) && s.playing);
        assert_eq!(
            state.lock().unwrap().loads,
            vec!["Bravo".to_string(), "Alpha".to_string()]
        );
    }

    #[test]
    fn out_of_range_play_is_ignored() {
        let (_worker, state, events) = spawn_fake();
        let handle = connected(&events);
        handle.send(WorkerCommand::LoadCatalog(catalog())).unwrap();
        handle.send(WorkerCommand::PlayAt(7)).unwrap();
        handle.send(WorkerCommand::PlayAt(0)).unwrap();
        wait_until(&handle, |s| s.current == Some(0));
        assert_eq!(state.lock().unwrap().loads, vec!["Alpha".to_string()]);
    }

    #[test]
    fn shutdown_reports_the_disconnect() {
        let (worker, _state, events) = spawn_fake();
        let handle = connected(&events);
        assert!(worker.is_running());

        worker.shutdown();
        match next_event(&events) {
            Event::Disconnected(connection) => assert_eq!(connection, handle.id()),
            _ => panic!("expected a disconnect"),
        }
        assert_eq!(
            handle.send(WorkerCommand::Pause),
            Err(WorkerError::Disconnected)
        );
    }

    #[test]
    fn engine_failure_never_connects() {
        let (events, receiver) = mpsc::channel();
        let worker = PlaybackWorker::spawn(
            &settings(),
            || -> Result<FakeEngine, EngineError> { Err(EngineError::Output("no device".into())) },
            Arc::new(Recorder(Mutex::new(events))),
        );
        let id = worker.handle().id();
        match next_event(&receiver) {
            Event::Disconnected(connection) => assert_eq!(connection, id),
            _ => panic!("expected a disconnect without a connect"),
        }
        assert!(!worker.is_running());
    }

    #[test]
    fn unavailable_output_still_connects_silently() {
        let (events, receiver) = mpsc::channel();
        let worker = PlaybackWorker::spawn(
            &settings(),
            || {
                crate::playback::open_or_silent(|| -> Result<FakeEngine, EngineError> {
                    Err(EngineError::Output("no device".into()))
                })
            },
            Arc::new(Recorder(Mutex::new(events))),
        );
        let handle = connected(&receiver);
        assert_eq!(handle.id(), worker.handle().id());
        assert!(worker.is_running());
        assert_eq!(handle.status().current, None);
    }

    #[test]
    fn connection_ids_are_unique() {
        let (first, _) = WorkerHandle::channel();
        let (second, _) = WorkerHandle::channel();
        assert_ne!(first.id(), second.id());
    }
}
