use api_types::{dashboard::Settlement, expense::Expense};

/// Partitions expenses into per-type groups, keyed in first-appearance
/// order. Every expense lands in exactly one group; unrecognized types get
/// a group of their own rather than being dropped.
pub fn group_by_type(expenses: &[Expense]) -> Vec<(String, Vec<&Expense>)> {
    let mut groups: Vec<(String, Vec<&Expense>)> = Vec::new();
    for expense in expenses {
        match groups.iter_mut().find(|(kind, _)| *kind == expense.kind) {
            Some((_, group)) => group.push(expense),
            None => groups.push((expense.kind.clone(), vec![expense])),
        }
    }
    groups
}

/// Renders the settlement plan as plain English, one transaction per line.
///
/// Ordering fidelity to the server response is a hard requirement: payers
/// and their transactions are emitted exactly in the order given, with no
/// re-sorting here.
pub fn settlement_text(settlement: &Settlement) -> String {
    settlement
        .entries
        .iter()
        .map(|(payer, lines)| {
            lines
                .iter()
                .map(|line| format!("{payer} {line}"))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Comma-joined sharer names for an expense row.
pub fn shared_by_label(expense: &Expense) -> String {
    if expense.shared_by.is_empty() {
        return "No one".to_string();
    }
    expense
        .shared_by
        .iter()
        .map(|member| member.member_name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
