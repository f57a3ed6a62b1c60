//! Periodic transport reporter for UI updates.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread::JoinHandle,
    time::Duration,
};

use crate::session::TransportControl;

/// Snapshot of transport state sent to UI consumers. Times are milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Report {
    pub position_ms: u64,
    pub duration_ms: u64,
    pub playing: bool,
}

impl Report {
    /// Progress through the track in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        (self.position_ms as f64 / self.duration_ms as f64).clamp(0.0, 1.0)
    }
}

/// Background reporter that polls a [`TransportControl`] at fixed intervals
/// and calls back whenever the report changes.
#[derive(Clone)]
pub struct Reporter {
    transport: Arc<dyn TransportControl + Send + Sync>,
    report: Arc<Mutex<dyn Fn(Report) + Send>>,
    interval: Duration,
    finish: Arc<AtomicBool>,
    thread_handle: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Reporter {
    /// Create a new reporter for the given transport and callback.
    pub fn new(
        transport: Arc<dyn TransportControl + Send + Sync>,
        report: Arc<Mutex<dyn Fn(Report) + Send>>,
        interval: Duration,
    ) -> Self {
        Self {
            transport,
            report,
            interval,
            finish: Arc::new(AtomicBool::new(false)),
            thread_handle: Arc::new(Mutex::new(None)),
        }
    }

    fn poll(&self) -> Report {
        Report {
            position_ms: self.transport.current_position(),
            duration_ms: self.transport.duration(),
            playing: self.transport.is_playing(),
        }
    }

    fn run(&self) {
        let mut last_report = Report::default();

        loop {
            let report = self.poll();

            if report != last_report {
                (*self.report.lock().unwrap())(report);
                last_report = report;
            }

            if self.finish.load(Ordering::Relaxed) {
                break;
            }

            std::thread::sleep(self.interval);
        }
    }

    /// Start the background reporting thread.
    pub fn start(&self) {
        self.stop();
        self.finish.store(false, Ordering::Relaxed);
        let this = self.clone();
        let handle = std::thread::spawn(move || this.run());
        *self.thread_handle.lock().unwrap() = Some(handle);
    }

    /// Stop the background reporting thread.
    pub fn stop(&self) {
        self.finish.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread_handle.lock().unwrap().take() {
            if handle.thread().id() == std::thread::current().id() {
                log::warn!("reporter stop called from reporter thread; skipping join");
            } else if handle.join().is_err() {
                log::warn!("reporter thread panicked during join");
            }
        }
    }
}
