//! Session state types.

use serde::Serialize;

use crate::catalog::Catalog;
use crate::playback::WorkerHandle;

/// Load readiness: whether the worker connection and the catalog are both
/// available, and whether the catalog has been handed to the worker.
#[derive(Debug, Default)]
pub(crate) enum Readiness {
    #[default]
    Idle,
    Connected(WorkerHandle),
    Loaded(Catalog),
    /// The catalog has been handed to `worker`; `cued` is the index that
    /// worker was last told to play.
    Ready {
        worker: WorkerHandle,
        catalog: Catalog,
        cued: Option<usize>,
    },
}

impl Readiness {
    pub(crate) fn worker(&self) -> Option<&WorkerHandle> {
        match self {
            Readiness::Connected(worker) | Readiness::Ready { worker, .. } => Some(worker),
            Readiness::Idle | Readiness::Loaded(_) => None,
        }
    }

    pub(crate) fn catalog(&self) -> Option<&Catalog> {
        match self {
            Readiness::Loaded(catalog) | Readiness::Ready { catalog, .. } => Some(catalog),
            Readiness::Idle | Readiness::Connected(_) => None,
        }
    }
}

/// The user's current track, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Selection {
    #[default]
    None,
    Playing(usize),
    Paused(usize),
}

impl Selection {
    pub(crate) fn index(self) -> Option<usize> {
        match self {
            Selection::None => None,
            Selection::Playing(index) | Selection::Paused(index) => Some(index),
        }
    }
}

/// Which half of the readiness handshake has happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialReadiness {
    Connected,
    Loaded,
}

/// Externally visible phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    PartiallyReady(PartialReadiness),
    Ready,
    TrackSelected(usize),
    Paused(usize),
}

impl SessionPhase {
    pub(crate) fn derive(readiness: &Readiness, selection: Selection) -> Self {
        match (readiness, selection) {
            (Readiness::Idle, _) => SessionPhase::Idle,
            (Readiness::Connected(_), _) => {
                SessionPhase::PartiallyReady(PartialReadiness::Connected)
            }
            (Readiness::Loaded(_), _) => SessionPhase::PartiallyReady(PartialReadiness::Loaded),
            (Readiness::Ready { .. }, Selection::None) => SessionPhase::Ready,
            (Readiness::Ready { .. }, Selection::Playing(index)) => {
                SessionPhase::TrackSelected(index)
            }
            (Readiness::Ready { .. }, Selection::Paused(index)) => SessionPhase::Paused(index),
        }
    }
}

/// What observers receive after every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    /// Selected catalog index, kept while the worker is disconnected.
    pub current: Option<usize>,
    pub paused: bool,
    pub shuffle: bool,
    pub track_count: usize,
    /// Bumped every time a scan replaces the catalog.
    pub catalog_revision: u64,
}

/// Whether a list renderer should draw a catalog row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowVisibility {
    Visible,
    Hidden,
}
