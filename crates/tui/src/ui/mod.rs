pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    app::{AppState, HomeFocus, Screen},
    store::LedgerStore,
};

pub use terminal::{TerminalHandle as Terminal, restore_terminal, setup_terminal};
pub use theme::{Theme, expense_color};

pub fn render(frame: &mut Frame<'_>, state: &AppState, store: &LedgerStore) {
    let area = frame.area();
    match state.screen {
        Screen::Auth => screens::auth::render(frame, area, state),
        Screen::Home => render_shell(frame, area, state, store),
    }
}

fn render_shell(frame: &mut Frame<'_>, area: Rect, state: &AppState, store: &LedgerStore) {
    let theme = Theme::default();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Bottom bar
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, store, &theme);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(0)])
        .split(layout[1]);

    screens::side_panel::render(frame, columns[0], state, store);
    screens::dashboard::render(frame, columns[1], state, store);

    render_bottom_bar(frame, layout[2], state, &theme);
}

fn render_info_bar(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &AppState,
    store: &LedgerStore,
    theme: &Theme,
) {
    let user = store
        .identity()
        .map(|identity| identity.username.as_str())
        .unwrap_or("-");
    let refresh = state
        .last_refresh
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut parts = vec![
        Span::styled("User", Style::default().fg(theme.dim)),
        Span::raw(format!(": {user}  ")),
        Span::styled("Members", Style::default().fg(theme.dim)),
        Span::raw(format!(": {}  ", store.members().len())),
        Span::styled("Refresh", Style::default().fg(theme.dim)),
        Span::raw(format!(": {refresh}  ")),
    ];
    if let Some(status) = &state.status {
        parts.push(Span::styled(
            status.clone(),
            Style::default().fg(theme.error),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let hints: &[(&str, &str)] = match state.focus {
        HomeFocus::Browse => &[
            ("m", "members"),
            ("e", "expense"),
            ("s", "settlement"),
            ("r", "refresh"),
            ("d", "delete expense"),
            ("D", "remove member"),
            ("x", "reset"),
            ("q", "quit"),
        ],
        HomeFocus::MemberForm => &[
            ("Tab", "next"),
            ("Ctrl+N", "add field"),
            ("Ctrl+R", "remove field"),
            ("Enter", "submit"),
            ("Esc", "cancel"),
        ],
        HomeFocus::ExpenseForm => &[
            ("Tab", "next field"),
            ("Space", "select/toggle"),
            ("Up/Down", "move"),
            ("Enter", "submit"),
            ("Esc", "cancel"),
        ],
    };

    let mut parts: Vec<Span<'static>> = Vec::new();
    for (index, (key, label)) in hints.iter().enumerate() {
        if index > 0 {
            parts.push(Span::styled("  │  ", Style::default().fg(theme.border)));
        }
        parts.push(Span::styled(
            key.to_string(),
            Style::default().fg(theme.accent),
        ));
        parts.push(Span::raw(format!(" {label}")));
    }

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}
