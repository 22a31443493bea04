use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};

use crate::{
    app::{AppState, HomeFocus},
    forms::ExpenseField,
    store::LedgerStore,
    ui::Theme,
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, store: &LedgerStore) {
    let theme = Theme::default();

    let greeting = match store.identity() {
        Some(identity) => format!(" Hello, {} ", identity.name),
        None => " Hello There ".to_string(),
    };
    let block = Block::default()
        .title(greeting)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = match state.focus {
        HomeFocus::Browse => browse_lines(state, store, &theme),
        HomeFocus::MemberForm => member_form_lines(state, &theme),
        HomeFocus::ExpenseForm => expense_form_lines(state, store, &theme),
    };

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn browse_lines(state: &AppState, store: &LedgerStore, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        "Group members",
        Style::default().fg(theme.dim),
    ))];

    if store.members().is_empty() {
        lines.push(Line::from(Span::styled(
            "No members yet. Press m to add.",
            Style::default().fg(theme.dim),
        )));
        return lines;
    }

    for (index, member) in store.members().iter().enumerate() {
        let selected = index == state.selected_member;
        let style = if selected {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text)
        };
        let marker = if selected { "> " } else { "  " };
        lines.push(Line::from(Span::styled(
            format!("{marker}{member}"),
            style,
        )));
    }

    lines
}

fn member_form_lines(state: &AppState, theme: &Theme) -> Vec<Line<'static>> {
    let draft = &state.member_draft;
    let mut lines = vec![Line::from(Span::styled(
        "Add Group Members",
        Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
    ))];

    for (index, name) in draft.names.iter().enumerate() {
        let focused = index == draft.selected;
        let cursor = if focused { "│" } else { "" };
        let style = if focused {
            Style::default().fg(theme.accent)
        } else {
            Style::default().fg(theme.text)
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("Member {:>2}: ", index + 1),
                Style::default().fg(theme.dim),
            ),
            Span::styled(format!("{name}{cursor}"), style),
        ]));
    }

    if let Some(message) = &draft.message {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(theme.error),
        )));
    }

    lines
}

fn expense_form_lines(
    state: &AppState,
    store: &LedgerStore,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let draft = &state.expense_draft;
    let focus_style = Style::default().fg(theme.accent);
    let field_style = |field: ExpenseField| {
        if draft.focus == field {
            focus_style
        } else {
            Style::default().fg(theme.text)
        }
    };

    let mut lines = vec![
        Line::from(Span::styled(
            "Add Expense",
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("       Type: ", Style::default().fg(theme.dim)),
            Span::styled(draft.kind().as_str(), field_style(ExpenseField::Kind)),
        ]),
        Line::from(vec![
            Span::styled("     Amount: ", Style::default().fg(theme.dim)),
            Span::styled(draft.amount.clone(), field_style(ExpenseField::Amount)),
        ]),
        Line::from(vec![
            Span::styled("Description: ", Style::default().fg(theme.dim)),
            Span::styled(
                draft.description.clone(),
                field_style(ExpenseField::Description),
            ),
        ]),
    ];

    lines.push(Line::from(Span::styled(
        "Paid by",
        field_style(ExpenseField::PaidBy).add_modifier(Modifier::BOLD),
    )));
    for (index, member) in store.members().iter().enumerate() {
        let chosen = draft.paid_by == Some(index);
        let cursor = draft.focus == ExpenseField::PaidBy && draft.cursor == index;
        lines.push(choice_line(member, chosen, cursor, "(•)", "( )", theme));
    }

    lines.push(Line::from(Span::styled(
        "Shared by",
        field_style(ExpenseField::SharedBy).add_modifier(Modifier::BOLD),
    )));
    for (index, member) in store.members().iter().enumerate() {
        let chosen = draft.shared.iter().any(|name| name == member);
        let cursor = draft.focus == ExpenseField::SharedBy && draft.cursor == index;
        lines.push(choice_line(member, chosen, cursor, "[x]", "[ ]", theme));
    }

    if let Some(message) = &draft.message {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(theme.error),
        )));
    }

    lines
}

fn choice_line(
    member: &str,
    chosen: bool,
    under_cursor: bool,
    on: &str,
    off: &str,
    theme: &Theme,
) -> Line<'static> {
    let marker = if chosen { on } else { off };
    let style = if under_cursor {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text)
    };
    Line::from(Span::styled(format!("  {marker} {member}"), style))
}
