use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};

use crate::{
    app::AppState,
    store::{LedgerStore, Summary},
    ui::{Theme, expense_color},
    views,
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, store: &LedgerStore) {
    let theme = Theme::default();

    let heading = match store.dashboard_name() {
        Some(name) => format!(" {name} Expenses @ a glance "),
        None => " Your Expenses @ a glance ".to_string(),
    };
    let block = Block::default()
        .title(heading)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(0)])
        .split(inner);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    frame.render_widget(
        Paragraph::new(summary_lines(store.summary(), &theme)).wrap(Wrap { trim: false }),
        columns[0],
    );
    frame.render_widget(
        Paragraph::new(settlement_lines(state, &theme)).wrap(Wrap { trim: false }),
        columns[1],
    );
    frame.render_widget(
        Paragraph::new(expense_lines(state, store, &theme)).wrap(Wrap { trim: false }),
        rows[1],
    );
}

/// Summary figures come straight from the dashboard endpoints; they are
/// not recomputed from the itemized list below and may briefly disagree
/// with it while refreshes are in flight.
fn summary_lines(summary: &Summary, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if summary.sum_by_type.is_empty() && summary.total_sum.is_none() {
        lines.push(Line::from(Span::styled(
            "Loading...",
            Style::default().fg(theme.dim),
        )));
    } else {
        for (kind, sum) in &summary.sum_by_type {
            let count = summary.count_by_type.get(kind).copied().unwrap_or(0);
            lines.push(Line::from(vec![
                Span::styled(format!("{kind}: "), Style::default().fg(expense_color(kind))),
                Span::raw(format!("${sum:.2} ({count})")),
            ]));
        }
    }

    // A fetched zero still renders; only the never-fetched state hides the
    // total line.
    if let Some(total) = summary.total_sum {
        let count = summary.count_total.unwrap_or(0);
        lines.push(Line::from(vec![
            Span::styled(
                "Total Expenses: ",
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("${total:.2} across {count}")),
        ]));
    }

    if !summary.balances.is_empty() {
        lines.push(Line::from(Span::styled(
            "Balances",
            Style::default().fg(theme.dim),
        )));
        for (member, balance) in &summary.balances {
            lines.push(Line::from(format!("  {member}: ${balance:.2}")));
        }
    }

    lines
}

fn settlement_lines(state: &AppState, theme: &Theme) -> Vec<Line<'static>> {
    let Some(settlement) = &state.settlement else {
        return vec![Line::from(Span::styled(
            "Press s for a settlement summary.",
            Style::default().fg(theme.dim),
        ))];
    };

    let mut lines = vec![Line::from(Span::styled(
        "Settlement Summary:",
        Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
    ))];
    for line in settlement.split('\n') {
        lines.push(Line::from(line.to_string()));
    }
    lines
}

fn expense_lines(state: &AppState, store: &LedgerStore, theme: &Theme) -> Vec<Line<'static>> {
    let expenses = store.expenses();
    if expenses.is_empty() {
        return vec![Line::from(Span::styled(
            "No expenses recorded.",
            Style::default().fg(theme.dim),
        ))];
    }

    let selected_id = expenses.get(state.selected_expense).map(|e| e.id);
    let mut lines = Vec::new();

    for (kind, group) in views::group_by_type(expenses) {
        let color = expense_color(&kind);
        lines.push(Line::from(Span::styled(
            kind.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));

        for expense in group {
            let selected = Some(expense.id) == selected_id;
            let marker = if selected { "> " } else { "  " };
            let style = if selected {
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text)
            };
            lines.push(Line::from(Span::styled(
                format!(
                    "{marker}{} ${:.2}  Paid by: {}  Shared by: {}",
                    expense.description,
                    expense.amount,
                    expense.paid_by,
                    views::shared_by_label(expense),
                ),
                style,
            )));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn zero_total_still_renders_after_a_fetch() {
        let summary = Summary {
            total_sum: Some(0.0),
            count_total: Some(0),
            ..Summary::default()
        };
        let lines = summary_lines(&summary, &Theme::default());
        assert!(
            lines
                .iter()
                .any(|line| line_text(line).contains("Total Expenses: $0.00"))
        );
        assert!(!lines.iter().any(|line| line_text(line) == "Loading..."));
    }

    #[test]
    fn total_line_waits_for_the_first_fetch() {
        let lines = summary_lines(&Summary::default(), &Theme::default());
        assert!(
            !lines
                .iter()
                .any(|line| line_text(line).contains("Total Expenses"))
        );
        assert!(lines.iter().any(|line| line_text(line) == "Loading..."));
    }
}
