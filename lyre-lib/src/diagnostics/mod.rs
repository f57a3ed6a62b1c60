//! Diagnostics helpers for front-ends.

pub mod reporter;

pub use reporter::{Report, Reporter};
