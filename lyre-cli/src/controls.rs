use std::sync::mpsc::Sender;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use log::{info, warn};
use lyre_lib::diagnostics::Report;
use lyre_lib::session::{PartialReadiness, RowVisibility, SessionPhase, SessionSnapshot};
use lyre_lib::{CallState, Coordinator, SessionError, Track};

const SEEK_STEP_MS: u64 = 5_000;

pub struct StatusSnapshot {
    pub text: String,
}

pub struct StatusArgs {
    pub report: Report,
    pub snapshot: SessionSnapshot,
    pub track: Option<Track>,
    pub call: CallState,
}

/// What the library panel shows.
pub struct LibraryView {
    /// `(catalog index, label)` of every visible row.
    pub rows: Vec<(usize, String)>,
    /// Position of the cursor within `rows`.
    pub selected: Option<usize>,
    pub message: Option<&'static str>,
}

/// Terminal-side state that is not part of the session.
#[derive(Default)]
pub struct View {
    pub cursor: usize,
    pub call: CallState,
}

pub fn status_text(args: StatusArgs) -> StatusSnapshot {
    let state = if args.report.playing {
        "▶ Playing"
    } else if args.snapshot.paused {
        "⏸ Paused"
    } else {
        "■ Stopped"
    };
    let current = format_time(args.report.position_ms);
    let total = format_time(args.report.duration_ms);
    let percent = args.report.progress() * 100.0;
    let track = match &args.track {
        Some(track) => format!("{} - {}", track.artist(), track.title()),
        None => "No track selected".to_string(),
    };
    let shuffle = if args.snapshot.shuffle { "on" } else { "off" };
    let text = format!(
        "{}   {} / {}   ({:>5.1}%)\n{}\nShuffle: {} | Call: {} | {}",
        state,
        current,
        total,
        percent,
        track,
        shuffle,
        call_label(args.call),
        phase_label(args.snapshot.phase),
    );

    StatusSnapshot { text }
}

pub fn library_view(coordinator: &Coordinator, view: &mut View, scanning: bool) -> LibraryView {
    let Some(catalog) = coordinator.catalog() else {
        let message = if scanning {
            "Scanning…"
        } else {
            "No songs found."
        };
        return LibraryView {
            rows: Vec::new(),
            selected: None,
            message: Some(message),
        };
    };

    view.cursor = view.cursor.min(catalog.len().saturating_sub(1));
    let rows: Vec<(usize, String)> = catalog
        .iter()
        .enumerate()
        .filter(|(index, _)| coordinator.row_visibility(*index) == RowVisibility::Visible)
        .map(|(index, track)| (index, format!("{} - {}", track.title(), track.artist())))
        .collect();
    let selected = rows
        .iter()
        .position(|(index, _)| *index >= view.cursor)
        .or_else(|| rows.len().checked_sub(1));
    if let Some(position) = selected {
        view.cursor = rows[position].0;
    }

    LibraryView {
        rows,
        selected,
        message: None,
    }
}

pub fn handle_key_event(
    coordinator: &Coordinator,
    view: &mut View,
    calls: &Sender<CallState>,
) -> bool {
    if event::poll(Duration::from_millis(100)).unwrap_or(false) {
        if let Ok(Event::Key(key)) = event::read() {
            if key.kind != KeyEventKind::Press {
                return true;
            }
            let result: Result<(), SessionError> = match key.code {
                KeyCode::Char('q') => return false,
                KeyCode::Up => {
                    move_cursor(coordinator, view, false);
                    Ok(())
                }
                KeyCode::Down => {
                    move_cursor(coordinator, view, true);
                    Ok(())
                }
                KeyCode::Char('g') | KeyCode::Char('G') => {
                    jump_to_current(coordinator, view);
                    Ok(())
                }
                KeyCode::Enter => coordinator.select_track(view.cursor),
                KeyCode::Char(' ') => coordinator.toggle_playback(),
                KeyCode::Char('n') | KeyCode::Char('N') => coordinator.next(),
                KeyCode::Char('p') | KeyCode::Char('P') => coordinator.previous(),
                KeyCode::Left => {
                    let target = coordinator.position().saturating_sub(SEEK_STEP_MS);
                    coordinator.seek(target)
                }
                KeyCode::Right => {
                    let target =
                        (coordinator.position() + SEEK_STEP_MS).min(coordinator.duration());
                    coordinator.seek(target)
                }
                KeyCode::Char('s') | KeyCode::Char('S') => coordinator
                    .toggle_shuffle()
                    .map(|shuffle| info!("shuffle {}", if shuffle { "on" } else { "off" })),
                KeyCode::Char('c') | KeyCode::Char('C') => {
                    view.call = toggle_call(view.call);
                    info!("simulated call: {}", call_label(view.call));
                    if calls.send(view.call).is_err() {
                        warn!("interruption monitor is not running");
                    }
                    Ok(())
                }
                _ => Ok(()),
            };
            if let Err(err) = result {
                warn!("{}", err);
            }
        }
    }

    true
}

/// Step the cursor over the catalog, skipping the hidden row.
fn move_cursor(coordinator: &Coordinator, view: &mut View, forward: bool) {
    let len = coordinator.snapshot().track_count;
    let mut next = view.cursor;
    loop {
        next = if forward {
            next + 1
        } else {
            match next.checked_sub(1) {
                Some(next) => next,
                None => return,
            }
        };
        if next >= len {
            return;
        }
        if !coordinator.is_current(next) {
            view.cursor = next;
            return;
        }
    }
}

/// Scroll the library to the playing track. Its own row is hidden, so the
/// cursor lands on the row after it, or the one before at the end.
fn jump_to_current(coordinator: &Coordinator, view: &mut View) {
    let snapshot = coordinator.snapshot();
    let Some(current) = snapshot.current else {
        return;
    };
    if current + 1 < snapshot.track_count {
        view.cursor = current + 1;
    } else if let Some(before) = current.checked_sub(1) {
        view.cursor = before;
    }
}

fn toggle_call(call: CallState) -> CallState {
    match call {
        CallState::Ringing | CallState::Active => CallState::Ended,
        CallState::Idle | CallState::Ended => CallState::Ringing,
    }
}

fn call_label(call: CallState) -> &'static str {
    match call {
        CallState::Idle => "idle",
        CallState::Ringing => "ringing",
        CallState::Active => "active",
        CallState::Ended => "ended",
    }
}

fn phase_label(phase: SessionPhase) -> &'static str {
    match phase {
        SessionPhase::Idle => "starting",
        SessionPhase::PartiallyReady(PartialReadiness::Connected) => "waiting for library",
        SessionPhase::PartiallyReady(PartialReadiness::Loaded) => "waiting for player",
        SessionPhase::Ready | SessionPhase::TrackSelected(_) | SessionPhase::Paused(_) => "ready",
    }
}

fn format_time(time_ms: u64) -> String {
    let seconds = time_ms.div_ceil(1000);
    let minutes = seconds / 60;
    let seconds = seconds % 60;
    let hours = minutes / 60;
    let minutes = minutes % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::Receiver;

    use super::*;
    use lyre_lib::playback::{WorkerCommand, WorkerHandle};

    fn ready() -> (Coordinator, Receiver<WorkerCommand>) {
        let coordinator = Coordinator::new();
        let (handle, commands) = WorkerHandle::channel();
        coordinator.on_connection_established(handle);
        coordinator.on_scan_completed(vec![
            Track::new(1, "Alpha", "A"),
            Track::new(2, "Bravo", "B"),
            Track::new(3, "Charlie", "C"),
        ]);
        (coordinator, commands)
    }

    #[test]
    fn formats_time_like_a_clock() {
        assert_eq!(format_time(0), "00:00:00");
        assert_eq!(format_time(1), "00:00:01");
        assert_eq!(format_time(3_723_000), "01:02:03");
    }

    #[test]
    fn library_hides_the_current_track() {
        let (coordinator, _commands) = ready();
        let mut view = View::default();
        let library = library_view(&coordinator, &mut view, false);
        assert_eq!(library.rows.len(), 3);
        assert_eq!(library.rows[0].1, "Alpha - A");

        coordinator.select_track(0).unwrap();
        let library = library_view(&coordinator, &mut view, false);
        let indices: Vec<usize> = library.rows.iter().map(|(index, _)| *index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(library.selected, Some(0));
        assert_eq!(view.cursor, 1);
    }

    #[test]
    fn empty_library_messages() {
        let coordinator = Coordinator::new();
        let mut view = View::default();
        assert_eq!(
            library_view(&coordinator, &mut view, true).message,
            Some("Scanning…")
        );
        assert_eq!(
            library_view(&coordinator, &mut view, false).message,
            Some("No songs found.")
        );
    }

    #[test]
    fn cursor_skips_the_hidden_row() {
        let (coordinator, _commands) = ready();
        coordinator.select_track(1).unwrap();

        let mut view = View::default();
        move_cursor(&coordinator, &mut view, true);
        assert_eq!(view.cursor, 2);
        move_cursor(&coordinator, &mut view, true);
        assert_eq!(view.cursor, 2);
        move_cursor(&coordinator, &mut view, false);
        assert_eq!(view.cursor, 0);

        let library = library_view(&coordinator, &mut view, false);
        let indices: Vec<usize> = library.rows.iter().map(|(index, _)| *index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(library.selected, Some(0));
    }

    #[test]
    fn jump_lands_next_to_the_playing_track() {
        let (coordinator, _commands) = ready();
        let mut view = View::default();
        jump_to_current(&coordinator, &mut view);
        assert_eq!(view.cursor, 0);

        coordinator.select_track(1).unwrap();
        jump_to_current(&coordinator, &mut view);
        assert_eq!(view.cursor, 2);

        coordinator.select_track(2).unwrap();
        jump_to_current(&coordinator, &mut view);
        assert_eq!(view.cursor, 1);
        let library = library_view(&coordinator, &mut view, false);
        assert_eq!(library.selected, Some(1));
        assert_eq!(library.rows[1].0, 1);
    }

    #[test]
    fn status_reports_pause_and_call() {
        let status = status_text(StatusArgs {
            report: Report {
                position_ms: 30_000,
                duration_ms: 120_000,
                playing: false,
            },
            snapshot: SessionSnapshot {
                phase: SessionPhase::Paused(0),
                current: Some(0),
                paused: true,
                shuffle: true,
                track_count: 1,
                catalog_revision: 1,
            },
            track: Some(Track::new(1, "Alpha", "A")),
            call: CallState::Ringing,
        });
        assert!(status.text.starts_with("⏸ Paused   00:00:30 / 00:02:00   ( 25.0%)"));
        assert!(status.text.contains("A - Alpha"));
        assert!(status.text.contains("Shuffle: on | Call: ringing | ready"));
    }
}
