use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{
    app::AppState,
    forms::{AuthMode, RegisterField},
    ui::Theme,
};

/// Calculates a centered rect for the form box.
fn centered_box(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let draft = &state.register;

    let mut fields: Vec<(&str, &str, bool, RegisterField)> = vec![
        ("Username", draft.username.as_str(), false, RegisterField::Username),
        ("Password", draft.password.as_str(), true, RegisterField::Password),
    ];
    if draft.mode == AuthMode::Register {
        fields.push(("Name", draft.name.as_str(), false, RegisterField::Name));
        fields.push((
            "Ledger name",
            draft.dashboard_name.as_str(),
            false,
            RegisterField::DashboardName,
        ));
    }

    let box_width = 40;
    let box_height = fields.len() as u16 * 2 + 2;
    let card_area = centered_box(box_width, box_height, area);

    frame.render_widget(Clear, card_area);

    let title = match draft.mode {
        AuthMode::Register => " register ",
        AuthMode::Login => " login ",
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));

    let inner = block.inner(card_area);
    frame.render_widget(block, card_area);

    let constraints: Vec<Constraint> = fields.iter().map(|_| Constraint::Length(2)).collect();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (index, (label, value, is_password, field)) in fields.iter().enumerate() {
        render_input(
            frame,
            rows[index],
            label,
            value,
            *is_password,
            draft.focus == *field,
            &theme,
        );
    }

    // Mode switch hint below the box.
    let hint_area = Rect {
        x: card_area.x,
        y: card_area.y + card_area.height,
        width: card_area.width,
        height: 1,
    };
    let hint = match draft.mode {
        AuthMode::Register => "Ctrl+T login to an existing account",
        AuthMode::Login => "Ctrl+T back to registration",
    };
    frame.render_widget(
        Paragraph::new(Span::styled(hint, Style::default().fg(theme.dim)))
            .alignment(Alignment::Center),
        hint_area,
    );

    if let Some(message) = &draft.message {
        let error_area = Rect {
            x: card_area.x,
            y: card_area.y + card_area.height + 1,
            width: card_area.width,
            height: 1,
        };
        frame.render_widget(
            Paragraph::new(Span::styled(
                message.as_str(),
                Style::default().fg(theme.error),
            ))
            .alignment(Alignment::Center),
            error_area,
        );
    }
}

fn render_input(
    frame: &mut Frame<'_>,
    area: Rect,
    label: &str,
    value: &str,
    is_password: bool,
    focused: bool,
    theme: &Theme,
) {
    let cursor = if focused { "│" } else { "" };
    let shown = if is_password {
        "•".repeat(value.len())
    } else {
        value.to_string()
    };

    let style = if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text)
    };

    let line = Line::from(vec![
        Span::styled(format!("{label:>12}: "), Style::default().fg(theme.dim)),
        Span::styled(format!("{shown}{cursor}"), style),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
