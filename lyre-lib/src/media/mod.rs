//! Media file inspection.

pub mod probe;

pub use probe::{probe_duration, read_tags, TrackTags};
