use log::{LevelFilter, Log, Metadata, Record};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, OnceLock};

const LOG_CAPACITY: usize = 500;

/// Most recent log lines, oldest first.
pub type LogBuffer = Arc<Mutex<VecDeque<String>>>;

struct SharedLogger {
    level: LevelFilter,
    buffer: LogBuffer,
    echo_stderr: bool,
}

impl Log for SharedLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format!("[{}] {}", record.level(), record.args());
        if self.echo_stderr {
            eprintln!("{}", line);
        }

        let mut buffer = self.buffer.lock().unwrap();
        if buffer.len() >= LOG_CAPACITY {
            buffer.pop_front();
        }
        buffer.push_back(line);
    }

    fn flush(&self) {}
}

static LOG_BUFFER: OnceLock<LogBuffer> = OnceLock::new();
static LOGGER: OnceLock<SharedLogger> = OnceLock::new();

fn level_from_env(value: Option<&str>) -> LevelFilter {
    match value.map(str::to_lowercase).as_deref() {
        Some("off") => LevelFilter::Off,
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Install the ring-buffer logger. Level comes from `RUST_LOG`; set
/// `LYRE_LOG_STDERR=1` to also echo every line to stderr.
pub fn init() -> LogBuffer {
    let buffer = LOG_BUFFER
        .get_or_init(|| Arc::new(Mutex::new(VecDeque::with_capacity(LOG_CAPACITY))))
        .clone();

    let level = level_from_env(std::env::var("RUST_LOG").ok().as_deref());

    let echo_stderr = std::env::var("LYRE_LOG_STDERR")
        .map(|value| value != "0")
        .unwrap_or(false);

    let logger = SharedLogger {
        level,
        buffer: buffer.clone(),
        echo_stderr,
    };

    let logger_ref = LOGGER.get_or_init(|| logger);
    if log::set_logger(logger_ref).is_ok() {
        log::set_max_level(level);
    }

    buffer
}

pub fn snapshot(buffer: &LogBuffer) -> Vec<String> {
    buffer.lock().unwrap().iter().cloned().collect()
}
