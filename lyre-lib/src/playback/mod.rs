//! Playback: engines that produce sound and the worker thread that drives them.

pub mod output;
pub mod worker;

pub use output::{open_or_silent, EngineError, PlaybackEngine, SilentEngine};
#[cfg(feature = "rodio-output")]
pub use output::RodioEngine;
pub use worker::{
    PlaybackWorker, TrackChange, WorkerCommand, WorkerError, WorkerHandle, WorkerListener,
    WorkerStatus,
};
