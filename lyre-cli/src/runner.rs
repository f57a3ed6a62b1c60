use std::{
    io,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc, Arc, Mutex,
    },
    thread::sleep,
    time::Duration,
};

use clap::ArgMatches;
use crossterm::{
    cursor, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use lyre_lib::diagnostics::{Report, Reporter};
use lyre_lib::playback::{PlaybackWorker, SilentEngine, WorkerListener};
use lyre_lib::settings::{Settings, WorkerSettings};
use lyre_lib::{Coordinator, DirectorySource, InterruptionMonitor, LibraryScanner};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::cli::{self, CliError};
use crate::logging::{self, LogBuffer};
use crate::{controls, ui};

pub fn run(args: &ArgMatches, log_buffer: LogBuffer) -> Result<i32, CliError> {
    match args.subcommand() {
        Some(("scan", scan_args)) => return cli::scan::run(scan_args),
        Some(("create", create_args)) => return cli::create::run(create_args),
        _ => {}
    }

    let settings = cli::load_settings(args)?;
    let root = settings.library.root.clone().ok_or(CliError::NoLibrary)?;
    play(root, &settings, args.get_flag("silent"), log_buffer)
}

fn play(
    root: PathBuf,
    settings: &Settings,
    silent: bool,
    log_buffer: LogBuffer,
) -> Result<i32, CliError> {
    info!("Starting Lyre on {}", root.display());

    let coordinator = Coordinator::new();
    let worker = spawn_worker(&settings.worker, silent, Arc::new(coordinator.clone()));

    // The scan is never cancelled; a late result lands on a closed session.
    let scanning = Arc::new(AtomicBool::new(true));
    let scan_done = scanning.clone();
    let scan_target = coordinator.clone();
    LibraryScanner::new(DirectorySource::from_settings(&root, &settings.library)).scan(
        move |tracks| {
            scan_target.on_scan_completed(tracks);
            scan_done.store(false, Ordering::SeqCst);
        },
    );

    let (calls, call_signals) = mpsc::channel();
    let monitor = InterruptionMonitor::spawn(call_signals, coordinator.clone());

    let latest = Arc::new(Mutex::new(Report::default()));
    let report_sink = latest.clone();
    let reporter = Reporter::new(
        Arc::new(coordinator.clone()),
        Arc::new(Mutex::new(move |report: Report| {
            *report_sink.lock().unwrap() = report;
        })),
        settings.worker.report_interval(),
    );
    reporter.start();

    let _raw_mode = RawModeGuard::enable().ok();
    let mut terminal = {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, EnterAlternateScreen, cursor::Hide);
        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend).ok()
    };

    let mut view = controls::View::default();

    // UI / input loop.
    loop {
        if let Some(term) = terminal.as_mut() {
            let library =
                controls::library_view(&coordinator, &mut view, scanning.load(Ordering::SeqCst));
            let status = controls::status_text(controls::StatusArgs {
                report: *latest.lock().unwrap(),
                snapshot: coordinator.snapshot(),
                track: coordinator.current_track(),
                call: view.call,
            });
            let log_lines = logging::snapshot(&log_buffer);
            ui::draw(term, &library, &status, &log_lines);
        }

        if !controls::handle_key_event(&coordinator, &mut view, &calls) {
            break;
        }

        sleep(Duration::from_millis(50));
    }

    reporter.stop();
    coordinator.close();
    drop(calls);
    let _ = monitor.join();
    worker.shutdown();

    // Restore the terminal state before exiting.
    if let Some(mut term) = terminal {
        let _ = term.show_cursor();
        let stdout = term.backend_mut();
        let _ = execute!(stdout, LeaveAlternateScreen, cursor::Show);
    }

    info!("Lyre stopped");
    Ok(0)
}

#[cfg(feature = "rodio-output")]
fn spawn_worker(
    settings: &WorkerSettings,
    silent: bool,
    listener: Arc<dyn WorkerListener>,
) -> PlaybackWorker {
    if silent {
        return spawn_silent_worker(settings, listener);
    }
    // Without an output device the session still connects and keeps time.
    PlaybackWorker::spawn(
        settings,
        || lyre_lib::playback::open_or_silent(lyre_lib::playback::RodioEngine::open),
        listener,
    )
}

#[cfg(not(feature = "rodio-output"))]
fn spawn_worker(
    settings: &WorkerSettings,
    silent: bool,
    listener: Arc<dyn WorkerListener>,
) -> PlaybackWorker {
    if !silent {
        info!("built without audio output; playing silently");
    }
    spawn_silent_worker(settings, listener)
}

fn spawn_silent_worker(
    settings: &WorkerSettings,
    listener: Arc<dyn WorkerListener>,
) -> PlaybackWorker {
    PlaybackWorker::spawn(
        settings,
        || -> Result<SilentEngine, lyre_lib::playback::EngineError> { Ok(SilentEngine::new()) },
        listener,
    )
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
