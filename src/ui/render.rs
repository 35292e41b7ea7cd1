//! Frame rendering
//!
//! Turns console state into a fixed grid of text lines, one per terminal
//! row. The terminal backend only paints what this produces, so the
//! whole screen can be checked in tests without a tty.

use unicode_width::UnicodeWidthChar;

use crate::console::{Console, InputMode, StatusLevel};
use crate::layout::Region;
use crate::models::{execution_id, ExecutionState, Mode};
use crate::navigation::View;

/// Trailing output lines shown under an expanded row
pub const EXPANDED_PREVIEW_LINES: usize = 3;

/// Tab stops every eight columns
pub const TAB_WIDTH: usize = 8;

/// A rendered screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Exactly one entry per row
    pub lines: Vec<String>,
    /// Row holding the highlighted action
    pub highlight: Option<usize>,
    /// Whether the status line carries an error
    pub status_is_error: bool,
}

impl Frame {
    fn blank(height: usize) -> Self {
        Self {
            lines: vec![String::new(); height],
            highlight: None,
            status_is_error: false,
        }
    }

    pub fn height(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(String::as_str)
    }

    /// Whether any row contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }

    /// Copy `rows` into `region`, truncating both ways
    fn place(&mut self, region: Region, rows: &[String], width: usize) {
        for (offset, row) in rows.iter().take(region.len()).enumerate() {
            if let Some(slot) = self.lines.get_mut(region.start + offset) {
                *slot = fit(row, width);
            }
        }
    }
}

/// Render the whole console
pub fn render(console: &Console) -> Frame {
    let layout = console.layout();
    let width = layout.width();
    let regions = *layout.regions();
    let mut frame = Frame::blank(layout.height());

    frame.place(regions.header, &header_rows(console, width), width);

    let (rows, selected_row) = action_rows(console);
    let window = regions.action_list.len();
    let offset = (selected_row + 1).saturating_sub(window);
    frame.place(regions.action_list, &rows[offset.min(rows.len())..], width);
    if window > 0 {
        frame.highlight = Some(regions.action_list.start + selected_row - offset);
    }

    if layout.results_visible() {
        frame.place(regions.results, layout.visible_result_lines(), width);
    }

    let (status_rows, is_error) = status_rows(console, width);
    frame.place(regions.status, &status_rows, width);
    frame.status_is_error = is_error;

    frame
}

fn header_rows(console: &Console, width: usize) -> Vec<String> {
    let navigation = console.navigation();
    let mode = navigation.mode();
    let environment = navigation.environment();

    let mut title = format!(" tview | {} | {}", mode.description(), environment);
    if console.registry().is_prefix_overridden(environment.name()) {
        title.push_str(" (prefix override)");
    }
    if let Some(View::Detail(id)) = navigation.current_view() {
        title.push_str(&format!(" | detail {}", id));
    }

    let modes: String = Mode::ALL
        .iter()
        .map(|m| tab(m.as_str(), *m == mode))
        .collect();
    let environments: String = navigation
        .environments()
        .iter()
        .map(|e| tab(e.name(), e == environment))
        .collect();

    vec![title, modes, environments, rule(width)]
}

/// Action rows plus the row index of the highlighted action
fn action_rows(console: &Console) -> (Vec<String>, usize) {
    let navigation = console.navigation();
    let registry = console.registry();
    let environment = navigation.environment().name();
    let actions = console.actions();
    let selected = navigation.item_index().min(actions.len().saturating_sub(1));

    let mut rows = Vec::with_capacity(actions.len());
    let mut selected_row = 0;

    for (index, action) in actions.iter().enumerate() {
        let record = if registry.contains_command(&action.id) {
            console
                .engine()
                .peek(&execution_id(&action.id, environment))
        } else {
            None
        };
        let state = record.as_ref().map(|r| r.state).unwrap_or_default();

        if index == selected {
            selected_row = rows.len();
        }
        let marker = if index == selected { '>' } else { ' ' };
        let mut row = format!(
            "{} {} {:<20} {}",
            marker,
            state.glyph(),
            action.name,
            action.description
        );

        if let Some(record) = &record {
            match record.state {
                ExecutionState::Executing => {
                    if let Some(secs) = record.elapsed_seconds() {
                        row.push_str(&format!("  ({}s)", secs));
                    }
                }
                ExecutionState::Error => {
                    if let Some(code) = record.exit_code {
                        row.push_str(&format!("  (exit {})", code));
                    }
                }
                _ => {}
            }
        }
        rows.push(row);

        if let Some(record) = record.filter(|r| r.expanded) {
            for line in tail(record.display_output(), EXPANDED_PREVIEW_LINES) {
                rows.push(format!("      {}", line));
            }
        }
    }

    (rows, selected_row)
}

fn status_rows(console: &Console, width: usize) -> (Vec<String>, bool) {
    let (message, is_error) = match console.input() {
        InputMode::Command(buffer) => (format!("/{}_", buffer), false),
        InputMode::Normal => {
            let status = console.status();
            match status.level {
                StatusLevel::Info => (format!(" {}", status.text), false),
                StatusLevel::Error => (format!(" ! {}", status.text), true),
            }
        }
    };

    let stats = console.engine().statistics();
    let running = console.engine().executing_ids().len();
    let mut hints = format!(
        " run:{} ok:{} fail:{} cancelled:{}",
        running, stats.succeeded, stats.failed, stats.cancelled
    );
    if console.connectivity_pending() {
        hints.push_str(" testing");
    }
    if console.layout().max_scroll() > 0 {
        hints.push_str(&format!(
            " scroll:{}/{}",
            console.layout().scroll_offset(),
            console.layout().max_scroll()
        ));
    }
    hints.push_str("  | l run  o open  c cancel  t test  / cmd  q quit");

    (vec![rule(width), message, hints], is_error)
}

fn tab(label: &str, active: bool) -> String {
    if active {
        format!("[{}]", label)
    } else {
        format!(" {} ", label)
    }
}

fn rule(width: usize) -> String {
    "─".repeat(width)
}

/// Last `count` lines of `text`
fn tail(text: &str, count: usize) -> Vec<&str> {
    let lines: Vec<&str> = text.lines().collect();
    lines[lines.len().saturating_sub(count)..].to_vec()
}

/// Truncate to `width` terminal columns
///
/// Tabs are expanded to the next stop and control characters are dropped,
/// so command output cannot move the cursor or wrap onto the next row.
pub fn fit(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut used = 0;

    for c in text.chars() {
        if c == '\t' {
            let stop = ((used / TAB_WIDTH + 1) * TAB_WIDTH).min(width);
            out.extend(std::iter::repeat(' ').take(stop - used));
            used = stop;
            continue;
        }
        if c.is_control() {
            continue;
        }
        let columns = c.width().unwrap_or(0);
        if used + columns > width {
            break;
        }
        out.push(c);
        used += columns;
    }

    out
}
