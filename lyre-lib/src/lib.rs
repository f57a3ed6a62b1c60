//! # Lyre Audio Library
//!
//! Core of the Lyre personal audio player: the track catalog, the library
//! scanner, the background playback worker and the session coordinator that
//! ties them together with interruption handling.

pub mod catalog;
pub mod diagnostics;
pub mod interruption;
pub mod library;
pub mod media;
pub mod playback;
pub mod session;
pub mod settings;
mod tools;

pub use catalog::{Catalog, Track};
pub use interruption::{CallState, InterruptionMonitor, InterruptionTarget};
pub use library::{DirectorySource, LibraryScanner, TrackSource};
pub use session::{Coordinator, SessionError, SessionPhase, SessionSnapshot, TransportControl};
pub use settings::Settings;
