use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Terminal,
};

use crate::controls::{LibraryView, StatusSnapshot};

const CONTROLS_HELP: &str =
    "↑/↓=browse  g=now playing  enter=play  space=play/pause  n/p=next/prev  ←/→=seek 5s  s=shuffle  c=call  q=quit";

pub fn draw(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    library: &LibraryView,
    status: &StatusSnapshot,
    log_lines: &[String],
) {
    // Render the controls, playback, library and log panels.
    let _ = terminal.draw(|f| {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(5),
                Constraint::Min(6),
                Constraint::Length(8),
            ])
            .split(f.size());

        let controls = Paragraph::new(CONTROLS_HELP)
            .style(Style::default().fg(Color::Blue))
            .block(Block::default().borders(Borders::ALL).title("Controls"));
        f.render_widget(controls, chunks[0]);

        let status_widget = Paragraph::new(status.text.as_str())
            .style(
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
            .block(Block::default().borders(Borders::ALL).title("Playback"));
        f.render_widget(status_widget, chunks[1]);

        let library_block = Block::default().borders(Borders::ALL).title("Library");
        match library.message {
            Some(message) => {
                let empty = Paragraph::new(message)
                    .style(Style::default().fg(Color::Yellow))
                    .block(library_block);
                f.render_widget(empty, chunks[2]);
            }
            None => {
                let items: Vec<ListItem> = library
                    .rows
                    .iter()
                    .map(|(_, label)| ListItem::new(label.as_str()))
                    .collect();
                let list = List::new(items)
                    .block(library_block)
                    .highlight_style(
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                    .highlight_symbol("> ");
                let mut state = ListState::default();
                state.select(library.selected);
                f.render_stateful_widget(list, chunks[2], &mut state);
            }
        }

        let log_height = chunks[3].height.saturating_sub(2) as usize;
        let start = log_lines.len().saturating_sub(log_height);
        let log_text = if log_lines.is_empty() {
            "No logs yet.".to_string()
        } else {
            log_lines[start..].join("\n")
        };

        let log_widget = Paragraph::new(log_text)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title("Logs"));
        f.render_widget(log_widget, chunks[3]);
    });
}
