//! Playback session coordination.
//!
//! A [`Coordinator`] reconciles three independently timed inputs into one
//! playback state:
//!
//! - the library scan delivering its tracks ([`Coordinator::on_scan_completed`]),
//! - the playback worker connecting or going away ([`WorkerListener`]),
//! - interruptions such as incoming calls
//!   ([`crate::interruption::InterruptionTarget`]).
//!
//! The catalog is handed to the worker exactly once per connection, as soon
//! as both the connection and a non-empty catalog exist, whichever arrives
//! first. Transport commands sent before that point are ignored.
//!
//! All entry points take one lock, so commands from the UI, the worker and
//! the interruption monitor never interleave.

mod error;
mod machine;
mod state;
pub mod transport;

use std::sync::{Arc, Mutex};

use log::{info, warn};

use crate::catalog::{Catalog, Track};
use crate::interruption::InterruptionTarget;
use crate::playback::{TrackChange, WorkerHandle, WorkerListener};

pub use error::SessionError;
pub use state::{PartialReadiness, RowVisibility, SessionPhase, SessionSnapshot};
pub use transport::TransportControl;

use machine::Session;

/// Shared handle to one playback session. Clones refer to the same session.
#[derive(Clone, Default)]
pub struct Coordinator {
    session: Arc<Mutex<Session>>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the callback run after every state change.
    ///
    /// The callback runs on whichever thread made the change, after the
    /// session lock is released, so it may query the coordinator.
    pub fn set_observer(&self, observer: impl Fn(SessionSnapshot) + Send + Sync + 'static) {
        self.session.lock().unwrap().observer = Some(Arc::new(observer));
    }

    pub fn on_connection_established(&self, handle: WorkerHandle) {
        self.update(|session| session.connect(handle));
    }

    /// The worker is gone. The catalog and the selected index are kept for
    /// the next connection; playback is considered paused.
    pub fn on_connection_lost(&self) {
        self.update(Session::connection_lost);
    }

    /// Deliver a finished scan. An empty result leaves the session as it was.
    pub fn on_scan_completed(&self, tracks: Vec<Track>) {
        self.update(|session| session.scan_completed(tracks));
    }

    /// The worker moved on to another track by itself.
    pub fn on_track_changed(&self, change: TrackChange) {
        self.update(|session| session.track_changed(change));
    }

    /// Start the track at `index` of the catalog.
    pub fn select_track(&self, index: usize) -> Result<(), SessionError> {
        self.update(|session| session.select(index))
    }

    pub fn pause(&self) -> Result<(), SessionError> {
        self.update(Session::pause)
    }

    pub fn resume(&self) -> Result<(), SessionError> {
        self.update(Session::resume)
    }

    /// Pause when playing, resume when paused.
    pub fn toggle_playback(&self) -> Result<(), SessionError> {
        self.update(|session| {
            if session.snapshot().paused {
                session.resume()
            } else {
                session.pause()
            }
        })
    }

    pub fn next(&self) -> Result<(), SessionError> {
        self.update(|session| session.step(true))
    }

    pub fn previous(&self) -> Result<(), SessionError> {
        self.update(|session| session.step(false))
    }

    pub fn seek(&self, position_ms: u64) -> Result<(), SessionError> {
        self.update(|session| session.seek(position_ms))
    }

    /// Length of the selected track in milliseconds.
    pub fn duration(&self) -> u64 {
        self.session.lock().unwrap().duration_ms()
    }

    /// Playhead of the selected track in milliseconds.
    pub fn position(&self) -> u64 {
        self.session.lock().unwrap().position_ms()
    }

    pub fn is_playing(&self) -> bool {
        self.session.lock().unwrap().is_playing()
    }

    /// Change the worker's play order. The catalog itself is never reordered.
    pub fn set_shuffle(&self, shuffle: bool) -> Result<(), SessionError> {
        self.update(|session| session.set_shuffle(shuffle))
    }

    /// Flip shuffle and return the new setting.
    pub fn toggle_shuffle(&self) -> Result<bool, SessionError> {
        self.update(|session| {
            let shuffle = !session.shuffle();
            session.set_shuffle(shuffle).map(|()| shuffle)
        })
    }

    pub fn shuffle(&self) -> bool {
        self.session.lock().unwrap().shuffle()
    }

    pub fn is_current(&self, index: usize) -> bool {
        self.session.lock().unwrap().selected() == Some(index)
    }

    /// The selected track's row is hidden from the list.
    pub fn row_visibility(&self, index: usize) -> RowVisibility {
        if self.is_current(index) {
            RowVisibility::Hidden
        } else {
            RowVisibility::Visible
        }
    }

    pub fn catalog(&self) -> Option<Catalog> {
        self.session.lock().unwrap().catalog().cloned()
    }

    pub fn current_track(&self) -> Option<Track> {
        self.session.lock().unwrap().current_track().cloned()
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.lock().unwrap().phase()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().unwrap().snapshot()
    }

    pub fn is_closed(&self) -> bool {
        self.session.lock().unwrap().is_closed()
    }

    /// Tear the session down and stop the worker. Anything delivered
    /// afterwards is discarded.
    pub fn close(&self) {
        self.session.lock().unwrap().close();
    }

    fn update<R>(&self, change: impl FnOnce(&mut Session) -> R) -> R {
        let (result, notify) = {
            let mut session = self.session.lock().unwrap();
            let before = session.snapshot();
            let result = change(&mut session);
            let after = session.snapshot();
            let notify = match &session.observer {
                Some(observer) if after != before => Some((observer.clone(), after)),
                _ => None,
            };
            (result, notify)
        };
        if let Some((observer, snapshot)) = notify {
            observer(snapshot);
        }
        result
    }
}

impl WorkerListener for Coordinator {
    fn connected(&self, handle: WorkerHandle) {
        self.on_connection_established(handle);
    }

    fn track_changed(&self, change: TrackChange) {
        self.on_track_changed(change);
    }

    fn disconnected(&self, connection: u64) {
        self.update(|session| session.worker_disconnected(connection));
    }
}

impl InterruptionTarget for Coordinator {
    fn on_interruption_start(&self) {
        info!("playback interrupted");
        if let Err(err) = self.pause() {
            warn!("could not pause for interruption: {}", err);
        }
    }
}
