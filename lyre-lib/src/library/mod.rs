//! Asynchronous enumeration of the tracks on this machine.
//!
//! A [`LibraryScanner`] runs one storage query on a background thread and
//! hands the unordered result to a completion callback exactly once. A failed
//! query is not an error for the caller: it is logged and delivered as an
//! empty library.

mod directory;
mod error;

use std::thread::{self, JoinHandle};

use log::{info, warn};

use crate::catalog::Track;

pub use directory::{DirectorySource, DEFAULT_EXTENSIONS};
pub use error::LibraryError;

/// The storage query a scan runs.
pub trait TrackSource: Send + 'static {
    /// Enumerate every track currently in storage, in no particular order.
    fn query(&mut self) -> Result<Vec<Track>, LibraryError>;
}

impl<F> TrackSource for F
where
    F: FnMut() -> Result<Vec<Track>, LibraryError> + Send + 'static,
{
    fn query(&mut self) -> Result<Vec<Track>, LibraryError> {
        self()
    }
}

/// One-shot background scan over a [`TrackSource`].
///
/// `scan` consumes the scanner; a new scan needs a new scanner.
pub struct LibraryScanner<S: TrackSource> {
    source: S,
}

impl<S: TrackSource> LibraryScanner<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Run the query off the calling thread and deliver the result once.
    ///
    /// # Arguments
    ///
    /// * `deliver` - Completion callback, invoked on the scan thread with the
    ///   full (possibly empty) result.
    pub fn scan<F>(self, deliver: F) -> JoinHandle<()>
    where
        F: FnOnce(Vec<Track>) + Send + 'static,
    {
        let mut source = self.source;
        thread::spawn(move || {
            let tracks = match source.query() {
                Ok(tracks) => tracks,
                Err(err) => {
                    warn!("library scan failed: {}", err);
                    Vec::new()
                }
            };
            info!("library scan finished with {} track(s)", tracks.len());
            deliver(tracks);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn delivers_query_result_once() {
        let source = || -> Result<Vec<Track>, LibraryError> {
            Ok(vec![Track::new(2, "Bravo", "x"), Track::new(1, "Alpha", "y")])
        };
        let (sender, receiver) = mpsc::channel();

        let handle = LibraryScanner::new(source).scan(move |tracks| {
            sender.send(tracks).unwrap();
        });
        handle.join().unwrap();

        let delivered = receiver.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].title(), "Bravo");
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn failed_query_delivers_empty_library() {
        let source = || -> Result<Vec<Track>, LibraryError> {
            Err(LibraryError::RootNotFound(PathBuf::from("/missing")))
        };
        let (sender, receiver) = mpsc::channel();

        LibraryScanner::new(source)
            .scan(move |tracks| sender.send(tracks).unwrap())
            .join()
            .unwrap();

        assert!(receiver.recv().unwrap().is_empty());
    }
}
