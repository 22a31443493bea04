use std::io::{Stdout, stdout};

use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;

use crate::error::{AppError, Result};

pub type TerminalHandle = ratatui::Terminal<CrosstermBackend<Stdout>>;

pub fn setup_terminal() -> Result<TerminalHandle> {
    enable_raw_mode()?;
    let mut out = stdout();
    if let Err(err) = crossterm::execute!(out, EnterAlternateScreen) {
        // Half-done setup must not strand the shell in raw mode.
        let _ = disable_raw_mode();
        return Err(err.into());
    }
    Ok(ratatui::Terminal::new(CrosstermBackend::new(out))?)
}

/// Best-effort teardown. Every step runs even when an earlier one fails,
/// so a single broken step cannot leave the shell in the alternate screen
/// or without a cursor. Failures are collected into one error.
pub fn restore_terminal(terminal: &mut TerminalHandle) -> Result<()> {
    let steps = [
        disable_raw_mode(),
        crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen),
        terminal.show_cursor(),
    ];
    collect_failures(steps)
}

fn collect_failures<const N: usize>(steps: [std::io::Result<()>; N]) -> Result<()> {
    let failures: Vec<String> = steps
        .into_iter()
        .filter_map(|step| step.err().map(|err| err.to_string()))
        .collect();
    if failures.is_empty() {
        Ok(())
    } else {
        Err(AppError::Terminal(failures.join("; ")))
    }
}
