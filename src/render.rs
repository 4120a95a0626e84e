use crate::runner::{Status, ToolRunState};
use crossterm::cursor::{MoveToColumn, MoveUp};
use crossterm::execute;
use crossterm::style::{StyledContent, Stylize};
use crossterm::terminal::{Clear, ClearType};
use std::io::{self, IsTerminal, Write};
use std::time::Duration;
use tokio::sync::watch;
use unicode_width::UnicodeWidthStr;

const STATUS_COLUMN_WIDTH: usize = 10;

/// Drive the live status display until every tool reaches a terminal state,
/// then print the summary. This is the only writer to the terminal while the
/// update tasks run; it never mutates the shared states.
pub async fn watch(receivers: Vec<watch::Receiver<ToolRunState>>, tick: Duration) {
    let interactive = io::stdout().is_terminal();
    let mut screen = StatusScreen::new(interactive);
    let mut ticker = tokio::time::interval(tick);

    loop {
        ticker.tick().await;
        let snapshot: Vec<ToolRunState> = receivers.iter().map(|rx| rx.borrow().clone()).collect();
        screen.draw(&snapshot);
        if snapshot.iter().all(|state| state.status.is_terminal()) {
            print_summary(&snapshot, interactive);
            return;
        }
    }
}

pub fn status_word(status: Status) -> &'static str {
    match status {
        Status::Pending => "pending",
        Status::Checking => "checking…",
        Status::Updating => "updating…",
        Status::Done => "done",
        Status::Failed => "failed",
    }
}

/// Third column of a row: the version delta, the failure headline, or the
/// currently known version while the update is still in flight.
pub fn detail_cell(state: &ToolRunState) -> String {
    match state.status {
        Status::Done => version_delta(state),
        Status::Failed => state
            .failure
            .as_ref()
            .map(|failure| first_line(&failure.detail))
            .unwrap_or_default(),
        Status::Pending | Status::Checking | Status::Updating => {
            state.version_before.clone().unwrap_or_default()
        }
    }
}

pub fn summary_line(states: &[ToolRunState]) -> String {
    if states.is_empty() {
        return "0 tools updated.".to_string();
    }
    let failed = states
        .iter()
        .filter(|state| state.status == Status::Failed)
        .count();
    let succeeded = states.len() - failed;
    if failed == 0 {
        format!("All {succeeded} tools updated successfully.")
    } else {
        format!("{succeeded} succeeded, {failed} failed.")
    }
}

fn version_delta(state: &ToolRunState) -> String {
    match (&state.version_before, &state.version_after) {
        (Some(before), Some(after)) if before == after => format!("{before} (unchanged)"),
        (Some(before), Some(after)) => format!("{before} -> {after}"),
        (None, Some(after)) => format!("unknown -> {after}"),
        // The runner falls back to the pre-update version, so an after-gap
        // only happens when both probes failed.
        (Some(before), None) => format!("{before} (unchanged)"),
        (None, None) => "version unknown".to_string(),
    }
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or_default().to_string()
}

struct StatusScreen {
    interactive: bool,
    rows_drawn: u16,
    logged: Vec<Status>,
}

impl StatusScreen {
    fn new(interactive: bool) -> Self {
        Self {
            interactive,
            rows_drawn: 0,
            logged: Vec::new(),
        }
    }

    fn draw(&mut self, states: &[ToolRunState]) {
        if self.interactive {
            self.redraw_table(states);
        } else {
            self.log_transitions(states);
        }
    }

    fn redraw_table(&mut self, states: &[ToolRunState]) {
        let mut out = io::stdout();
        if self.rows_drawn > 0 {
            let _ = execute!(
                out,
                MoveUp(self.rows_drawn),
                MoveToColumn(0),
                Clear(ClearType::FromCursorDown)
            );
        }

        let name_width = states
            .iter()
            .map(|state| state.name.as_str().width())
            .max()
            .unwrap_or(0);
        for state in states {
            let _ = writeln!(
                out,
                "{}  {}  {}",
                pad(&state.name, name_width).bold(),
                styled_status(state.status),
                detail_cell(state)
            );
        }
        let _ = out.flush();
        self.rows_drawn = states.len() as u16;
    }

    fn log_transitions(&mut self, states: &[ToolRunState]) {
        if self.logged.len() != states.len() {
            self.logged = vec![Status::Pending; states.len()];
        }
        for (state, logged) in states.iter().zip(self.logged.iter_mut()) {
            if state.status == *logged {
                continue;
            }
            let detail = detail_cell(state);
            if detail.is_empty() {
                println!("{}: {}", state.name, status_word(state.status));
            } else {
                println!("{}: {} ({})", state.name, status_word(state.status), detail);
            }
            *logged = state.status;
        }
    }
}

fn styled_status(status: Status) -> StyledContent<String> {
    let padded = pad(status_word(status), STATUS_COLUMN_WIDTH);
    match status {
        Status::Pending => padded.dim(),
        Status::Checking | Status::Updating => padded.yellow(),
        Status::Done => padded.green(),
        Status::Failed => padded.red(),
    }
}

fn pad(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(padding))
}

fn print_summary(states: &[ToolRunState], interactive: bool) {
    println!();
    let line = summary_line(states);
    let failed_any = states.iter().any(|state| state.status == Status::Failed);
    if !interactive {
        println!("{line}");
    } else if failed_any {
        println!("{}", line.yellow());
    } else {
        println!("{}", line.green());
    }

    for state in states.iter().filter(|state| state.status == Status::Failed) {
        let Some(failure) = &state.failure else {
            continue;
        };
        println!();
        if interactive {
            println!("{}", format!("{} failed:", state.name).red());
        } else {
            println!("{} failed:", state.name);
        }
        for line in failure.detail.lines() {
            println!("  {line}");
        }
    }
}
