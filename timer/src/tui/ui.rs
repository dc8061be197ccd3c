//! Frame rendering for the countdown and the task picker.

use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::engine::TimerState;
use crate::tui::picker::{PickerMode, PickerState};

/// Help line under the countdown.
const COUNTDOWN_HELP: &str = "Press 'p' to pause/resume, Ctrl+C or 'q' to stop";

/// Formats a remaining time as `MM:SS`, or `H:MM:SS` from one hour up.
pub fn format_clock(remaining: Duration) -> String {
    // Round up so the display reaches 00:00 exactly when the timer ends.
    let mut secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        secs += 1;
    }

    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// The countdown status line: task, time left and state.
pub fn countdown_status(state: &TimerState, now: DateTime<FixedOffset>) -> String {
    let status = if state.is_paused() { "PAUSED" } else { "remaining" };
    format!(
        "{}: {} {}",
        state.task(),
        format_clock(state.remaining_at(now)),
        status
    )
}

/// Draws the running or paused countdown.
pub fn render_countdown(frame: &mut Frame, state: &TimerState, now: DateTime<FixedOffset>) {
    let [_, status_area, _, gauge_area, _, help_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inset(frame.area()));

    let status_style = if state.is_paused() {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            countdown_status(state, now),
            status_style,
        ))),
        status_area,
    );

    let progress = state.progress_at(now);
    frame.render_widget(
        Gauge::default()
            .block(Block::default().borders(Borders::ALL))
            .gauge_style(Style::default().fg(Color::Magenta))
            .ratio(progress)
            .label(format!("{:.0}%", progress * 100.0)),
        gauge_area,
    );

    frame.render_widget(
        Paragraph::new(COUNTDOWN_HELP).style(Style::default().fg(Color::DarkGray)),
        help_area,
    );
}

/// Draws the task picker list or its text input.
pub fn render_picker(frame: &mut Frame, picker: &PickerState) {
    let area = inset(frame.area());

    match picker.mode() {
        PickerMode::List => {
            let items: Vec<ListItem> = picker
                .items()
                .iter()
                .map(|item| ListItem::new(item.as_str()))
                .collect();
            let list = List::new(items)
                .block(Block::default().title("Select a task").borders(Borders::ALL))
                .highlight_style(Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD))
                .highlight_symbol("> ");

            let mut list_state = ListState::default().with_selected(Some(picker.selected()));
            frame.render_stateful_widget(list, area, &mut list_state);
        }
        PickerMode::Input => {
            let [title_area, _, input_area, _, help_area] = Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .areas(area);

            frame.render_widget(Paragraph::new("Enter task name:"), title_area);
            frame.render_widget(
                Paragraph::new(format!("{}█", picker.input()))
                    .block(Block::default().borders(Borders::ALL)),
                input_area,
            );
            frame.render_widget(
                Paragraph::new("(press esc to cancel)").style(Style::default().fg(Color::DarkGray)),
                help_area,
            );
        }
    }
}

/// Leaves a two-column margin around the content.
fn inset(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(2),
        y: area.y,
        width: area.width.saturating_sub(4),
        height: area.height,
    }
}
