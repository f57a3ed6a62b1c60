//! Liveness guard for the playback worker thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::WorkerListener;

/// Keeps `running` in sync with the worker thread's lifetime and reports the
/// end of the connection, however the thread exits.
pub(super) struct ConnectionGuard {
    running: Arc<AtomicBool>,
    listener: Arc<dyn WorkerListener>,
    connection: u64,
}

impl ConnectionGuard {
    /// Mark the worker as running.
    pub(super) fn new(
        running: Arc<AtomicBool>,
        listener: Arc<dyn WorkerListener>,
        connection: u64,
    ) -> Self {
        running.store(true, Ordering::SeqCst);
        Self {
            running,
            listener,
            connection,
        }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.listener.disconnected(self.connection);
    }
}
