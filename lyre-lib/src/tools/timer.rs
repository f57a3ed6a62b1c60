use std::time::{Duration, Instant};

/// Pausable wall-clock stopwatch used to emulate a playhead.
#[derive(Debug, Clone, Default)]
pub struct Timer {
    pub time: Duration,
    start_time: Option<Instant>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    pub fn un_pause(&mut self) {
        if self.start_time.is_none() {
            self.start_time = Some(Instant::now());
        }
    }

    pub fn pause(&mut self) {
        if let Some(start) = self.start_time {
            self.time += start.elapsed();
            self.start_time = None;
        }
    }

    /// Jump to `time`, keeping the running/paused state.
    pub fn seek(&mut self, time: Duration) {
        self.time = time;
        if self.start_time.is_some() {
            self.start_time = Some(Instant::now());
        }
    }

    pub fn is_running(&self) -> bool {
        self.start_time.is_some()
    }

    pub fn get_time(&self) -> Duration {
        if let Some(start) = self.start_time {
            self.time + start.elapsed()
        } else {
            self.time
        }
    }

    pub fn reset(&mut self) {
        self.start_time = None;
        self.time = Duration::new(0, 0);
    }
}
