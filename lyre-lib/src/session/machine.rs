//! The session state machine behind [`super::Coordinator`].
//!
//! Every method here runs with the coordinator's lock held.

use std::mem;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::catalog::{Catalog, Track};
use crate::playback::{TrackChange, WorkerCommand, WorkerHandle, WorkerStatus};

use super::error::SessionError;
use super::state::{Readiness, Selection, SessionPhase, SessionSnapshot};

pub(crate) type Observer = Arc<dyn Fn(SessionSnapshot) + Send + Sync>;

#[derive(Default)]
pub(crate) struct Session {
    readiness: Readiness,
    selection: Selection,
    shuffle: bool,
    closed: bool,
    catalog_revision: u64,
    /// Worker status as last read, used while the worker is gone.
    last_status: WorkerStatus,
    pub(crate) observer: Option<Observer>,
}

impl Session {
    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase(),
            current: self.selection.index(),
            paused: matches!(self.selection, Selection::Paused(_)),
            shuffle: self.shuffle,
            track_count: self.readiness.catalog().map_or(0, Catalog::len),
            catalog_revision: self.catalog_revision,
        }
    }

    pub(crate) fn phase(&self) -> SessionPhase {
        SessionPhase::derive(&self.readiness, self.selection)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub(crate) fn selected(&self) -> Option<usize> {
        self.selection.index()
    }

    pub(crate) fn catalog(&self) -> Option<&Catalog> {
        self.readiness.catalog()
    }

    pub(crate) fn current_track(&self) -> Option<&Track> {
        let index = self.selection.index()?;
        self.readiness.catalog()?.get(index)
    }

    pub(crate) fn connect(&mut self, handle: WorkerHandle) {
        if self.closed {
            debug!("worker {} connected after close; shutting it down", handle.id());
            let _ = handle.send(WorkerCommand::Shutdown);
            return;
        }
        if self.readiness.worker().map(WorkerHandle::id) == Some(handle.id()) {
            debug!("worker {} is already connected", handle.id());
            return;
        }

        info!("connected to playback worker {}", handle.id());
        match mem::take(&mut self.readiness) {
            Readiness::Idle | Readiness::Connected(_) => {
                self.readiness = Readiness::Connected(handle);
                if self.shuffle {
                    let _ = self.send(WorkerCommand::SetShuffle(true));
                }
            }
            Readiness::Loaded(catalog) | Readiness::Ready { catalog, .. } => {
                self.hand_off(handle, catalog);
            }
        }
    }

    pub(crate) fn connection_lost(&mut self) {
        if self.closed {
            return;
        }
        let Some(worker) = self.readiness.worker() else {
            debug!("connection lost while not connected");
            return;
        };
        info!("lost playback worker {}", worker.id());
        self.lose_connection();
    }

    pub(crate) fn worker_disconnected(&mut self, connection: u64) {
        match self.readiness.worker() {
            Some(worker) if worker.id() == connection => self.connection_lost(),
            _ => debug!("ignoring disconnect of stale worker {}", connection),
        }
    }

    pub(crate) fn scan_completed(&mut self, tracks: Vec<Track>) {
        if self.closed {
            debug!("discarding {} scanned tracks delivered after close", tracks.len());
            return;
        }
        let catalog = Catalog::from_scan(tracks);
        if catalog.is_empty() {
            info!("library scan found no tracks");
            return;
        }

        info!("library scan found {} tracks", catalog.len());
        self.catalog_revision += 1;
        self.selection = Selection::None;
        match mem::take(&mut self.readiness) {
            Readiness::Idle | Readiness::Loaded(_) => {
                self.readiness = Readiness::Loaded(catalog);
            }
            Readiness::Connected(worker) | Readiness::Ready { worker, .. } => {
                self.hand_off(worker, catalog);
            }
        }
    }

    /// The worker moved on by itself. Pause and resume commands still in
    /// flight apply to the new track, so the paused flag is kept. A change
    /// overtaken by a newer `PlayAt` or catalog is dropped.
    pub(crate) fn track_changed(&mut self, change: TrackChange) {
        if self.closed {
            return;
        }
        let Readiness::Ready {
            worker,
            catalog,
            cued,
        } = &mut self.readiness
        else {
            return;
        };
        let TrackChange {
            connection,
            index,
            cue,
        } = change;
        if worker.id() != connection || index >= catalog.len() {
            debug!("ignoring track change to {} from worker {}", index, connection);
            return;
        }
        if cue < worker.cues_sent() {
            debug!("track change to {} superseded by a newer command", index);
            return;
        }
        *cued = Some(index);
        self.selection = match self.selection {
            Selection::Paused(_) => Selection::Paused(index),
            Selection::None | Selection::Playing(_) => Selection::Playing(index),
        };
        debug!("worker moved on to track {}", index);
    }

    pub(crate) fn select(&mut self, index: usize) -> Result<(), SessionError> {
        if self.closed {
            return Ok(());
        }
        let len = self.readiness.catalog().map_or(0, Catalog::len);
        if index >= len {
            return Err(SessionError::InvalidIndex { index, len });
        }
        if !self.is_ready() {
            debug!("select {} ignored; worker not connected", index);
            return Ok(());
        }
        self.play(index)
    }

    pub(crate) fn pause(&mut self) -> Result<(), SessionError> {
        let Selection::Playing(index) = self.selection else {
            debug!("pause ignored; nothing is playing");
            return Ok(());
        };
        if self.closed || !self.is_ready() {
            return Ok(());
        }
        self.send(WorkerCommand::Pause)?;
        self.selection = Selection::Paused(index);
        Ok(())
    }

    pub(crate) fn resume(&mut self) -> Result<(), SessionError> {
        let Selection::Paused(index) = self.selection else {
            debug!("resume ignored; nothing is paused");
            return Ok(());
        };
        let cued = match &self.readiness {
            Readiness::Ready { cued, .. } if !self.closed => *cued,
            _ => {
                debug!("resume ignored; worker not connected");
                return Ok(());
            }
        };

        // A fresh worker has not loaded the track yet.
        if cued != Some(index) {
            return self.play(index);
        }
        self.send(WorkerCommand::Resume)?;
        self.selection = Selection::Playing(index);
        Ok(())
    }

    /// Move the selection one step, wrapping at both ends of the catalog.
    pub(crate) fn step(&mut self, forward: bool) -> Result<(), SessionError> {
        let Some(current) = self.selection.index() else {
            debug!("skip ignored; no track selected");
            return Ok(());
        };
        let len = match &self.readiness {
            Readiness::Ready { catalog, .. } if !self.closed => catalog.len(),
            _ => return Ok(()),
        };
        let target = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        self.play(target)
    }

    pub(crate) fn seek(&mut self, position_ms: u64) -> Result<(), SessionError> {
        if self.closed || self.selection == Selection::None || !self.is_ready() {
            debug!("seek to {}ms ignored; no track selected", position_ms);
            return Ok(());
        }
        self.send(WorkerCommand::SeekTo(position_ms))
    }

    pub(crate) fn set_shuffle(&mut self, shuffle: bool) -> Result<(), SessionError> {
        if self.closed {
            return Ok(());
        }
        self.shuffle = shuffle;
        if self.readiness.worker().is_none() {
            return Ok(());
        }
        self.send(WorkerCommand::SetShuffle(shuffle))
    }

    pub(crate) fn duration_ms(&mut self) -> u64 {
        self.transport_value(|status| status.duration_ms)
    }

    pub(crate) fn position_ms(&mut self) -> u64 {
        self.transport_value(|status| status.position_ms)
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.readiness
            .worker()
            .is_some_and(|worker| worker.status().playing)
    }

    pub(crate) fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Some(worker) = self.readiness.worker() {
            if worker.send(WorkerCommand::Shutdown).is_err() {
                debug!("worker {} was already gone at close", worker.id());
            }
        }
        self.readiness = Readiness::Idle;
        self.selection = Selection::None;
        self.observer = None;
        info!("session closed");
    }

    fn is_ready(&self) -> bool {
        matches!(self.readiness, Readiness::Ready { .. })
    }

    /// Live worker value while playing, the last known value while paused,
    /// zero otherwise.
    fn transport_value(&mut self, pick: fn(&WorkerStatus) -> u64) -> u64 {
        if self.selection == Selection::None {
            return 0;
        }
        if let Some(status) = self.readiness.worker().map(WorkerHandle::status) {
            self.last_status = status;
            if self.last_status.playing {
                return pick(&self.last_status);
            }
        }
        match self.selection {
            Selection::Paused(_) => pick(&self.last_status),
            Selection::None | Selection::Playing(_) => 0,
        }
    }

    fn hand_off(&mut self, worker: WorkerHandle, catalog: Catalog) {
        let mut sent = worker.send(WorkerCommand::LoadCatalog(catalog.clone()));
        if sent.is_ok() && self.shuffle {
            sent = worker.send(WorkerCommand::SetShuffle(true));
        }

        match sent {
            Ok(()) => {
                info!(
                    "handed {} tracks to playback worker {}",
                    catalog.len(),
                    worker.id()
                );
                self.readiness = Readiness::Ready {
                    worker,
                    catalog,
                    cued: None,
                };
            }
            Err(err) => {
                warn!("handoff to worker {} failed: {}", worker.id(), err);
                self.readiness = Readiness::Loaded(catalog);
                self.hold_selection();
            }
        }
    }

    fn play(&mut self, index: usize) -> Result<(), SessionError> {
        self.send(WorkerCommand::PlayAt(index))?;
        if let Readiness::Ready { cued, .. } = &mut self.readiness {
            *cued = Some(index);
        }
        self.selection = Selection::Playing(index);
        Ok(())
    }

    /// Forward a command; a disconnected worker drops it and the session
    /// falls back to the not-connected state.
    fn send(&mut self, command: WorkerCommand) -> Result<(), SessionError> {
        let sent = match self.readiness.worker() {
            Some(worker) => worker.send(command),
            None => return Err(SessionError::ConnectionLost),
        };
        if let Err(err) = sent {
            warn!("dropping worker command: {}", err);
            self.lose_connection();
            return Err(SessionError::ConnectionLost);
        }
        Ok(())
    }

    fn lose_connection(&mut self) {
        if let Some(worker) = self.readiness.worker() {
            self.last_status = worker.status();
        }
        self.readiness = match mem::take(&mut self.readiness) {
            Readiness::Idle | Readiness::Connected(_) => Readiness::Idle,
            Readiness::Loaded(catalog) | Readiness::Ready { catalog, .. } => {
                Readiness::Loaded(catalog)
            }
        };
        self.hold_selection();
    }

    fn hold_selection(&mut self) {
        if let Selection::Playing(index) = self.selection {
            self.selection = Selection::Paused(index);
        }
    }
}
