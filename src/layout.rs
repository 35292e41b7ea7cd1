//! Adaptive screen layout
//!
//! Splits the terminal into four contiguous line regions (header, action
//! list, results, status) and keeps a scroll offset over the results
//! content.
//!
//! ```text
//!   0 ┌──────────────┐
//!     │ header (4)   │
//!   4 ├──────────────┤
//!     │ action list  │  whole remainder when results are hidden,
//!     ├──────────────┤  compact allocation when they are shown
//!     │ results      │
//!     ├──────────────┤
//!     │ status (3)   │
//!   h └──────────────┘
//! ```
//!
//! `h` is the effective height, `max(rows, MIN_TERMINAL_HEIGHT)`. On a
//! terminal shorter than that, `status.end` lies past the last tty row and
//! the painter clips the frame.

use std::str::FromStr;

use crate::error::Error;

/// Fixed header height
pub const HEADER_LINES: usize = 4;
/// Fixed status height
pub const STATUS_LINES: usize = 3;
/// Smallest action list when results are shown
pub const MIN_ACTION_LINES: usize = 1;
/// Results get at least this many lines when the terminal allows it
pub const MIN_RESULT_LINES: usize = 3;
/// Compact action allocation below `LARGE_TERMINAL_THRESHOLD`
pub const COMPACT_ACTION_LINES_SMALL: usize = 4;
/// Compact action allocation at or above `LARGE_TERMINAL_THRESHOLD`
pub const COMPACT_ACTION_LINES_LARGE: usize = 8;
/// Height at which the larger compact allocation applies
pub const LARGE_TERMINAL_THRESHOLD: usize = 30;
/// Terminals shorter than this are laid out as if they were this tall
pub const MIN_TERMINAL_HEIGHT: usize = HEADER_LINES + STATUS_LINES + MIN_ACTION_LINES + 1;
/// Fallback terminal size
pub const DEFAULT_WIDTH: usize = 80;
pub const DEFAULT_HEIGHT: usize = 24;

/// Half-open line range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    pub start: usize,
    pub end: usize,
}

impl Region {
    pub fn new(start: usize, len: usize) -> Self {
        Self {
            start,
            end: start + len,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// The four screen regions
///
/// Contiguous and half-open; `status.end` equals the effective height,
/// which is the terminal height only when it is at least
/// `MIN_TERMINAL_HEIGHT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Regions {
    pub header: Region,
    pub action_list: Region,
    pub results: Region,
    pub status: Region,
}

impl Regions {
    /// Partition `height` lines, raised to `MIN_TERMINAL_HEIGHT` first
    pub fn compute(height: usize, results_visible: bool) -> Self {
        let height = height.max(MIN_TERMINAL_HEIGHT);
        let remainder = height - HEADER_LINES - STATUS_LINES;

        let (action_len, results_len) = if results_visible {
            let compact = if height < LARGE_TERMINAL_THRESHOLD {
                COMPACT_ACTION_LINES_SMALL
            } else {
                COMPACT_ACTION_LINES_LARGE
            };
            let action_len = if remainder >= compact + MIN_RESULT_LINES {
                compact
            } else {
                remainder
                    .saturating_sub(MIN_RESULT_LINES)
                    .max(MIN_ACTION_LINES)
            };
            (action_len, remainder - action_len)
        } else {
            (remainder, 0)
        };

        let header = Region::new(0, HEADER_LINES);
        let action_list = Region::new(header.end, action_len);
        let results = Region::new(action_list.end, results_len);
        let status = Region::new(results.end, STATUS_LINES);
        Self {
            header,
            action_list,
            results,
            status,
        }
    }

    /// Total lines covered
    pub fn total_height(&self) -> usize {
        self.status.end
    }
}

/// Scroll direction for the results panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl FromStr for ScrollDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(ScrollDirection::Up),
            "down" => Ok(ScrollDirection::Down),
            other => Err(Error::Other(format!("unknown scroll direction '{}'", other))),
        }
    }
}

/// Region allocator plus results scroll state
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    width: usize,
    height: usize,
    results_visible: bool,
    regions: Regions,
    content: Vec<String>,
    scroll_offset: usize,
}

impl LayoutEngine {
    /// Layout for a terminal of `width` x `height`; zero falls back to 80x24
    pub fn new(width: usize, height: usize) -> Self {
        let width = if width == 0 { DEFAULT_WIDTH } else { width };
        let height = if height == 0 { DEFAULT_HEIGHT } else { height };
        Self {
            width,
            height,
            results_visible: false,
            regions: Regions::compute(height, false),
            content: Vec::new(),
            scroll_offset: 0,
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if width > 0 {
            self.width = width;
        }
        if height > 0 {
            self.height = height;
        }
        self.recompute();
    }

    fn recompute(&mut self) {
        self.regions = Regions::compute(self.height, self.results_visible);
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Height used for layout (never below `MIN_TERMINAL_HEIGHT`)
    pub fn height(&self) -> usize {
        self.height.max(MIN_TERMINAL_HEIGHT)
    }

    pub fn regions(&self) -> &Regions {
        &self.regions
    }

    pub fn results_visible(&self) -> bool {
        self.results_visible
    }

    /// Replace results content, scroll to the top and show the panel
    pub fn show_results(&mut self, content: &str) {
        self.content = content.lines().map(str::to_string).collect();
        self.scroll_offset = 0;
        self.results_visible = true;
        self.recompute();
    }

    /// Replace results content but keep the scroll position (live output)
    pub fn update_results(&mut self, content: &str) {
        if !self.results_visible {
            self.show_results(content);
            return;
        }
        self.content = content.lines().map(str::to_string).collect();
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
    }

    /// Clear content and hide the panel
    pub fn hide_results(&mut self) {
        self.content.clear();
        self.scroll_offset = 0;
        self.results_visible = false;
        self.recompute();
    }

    /// Move the scroll offset, clamping at both ends
    pub fn scroll_results(&mut self, direction: ScrollDirection, amount: usize) {
        self.scroll_offset = match direction {
            ScrollDirection::Up => self.scroll_offset.saturating_sub(amount),
            ScrollDirection::Down => self
                .scroll_offset
                .saturating_add(amount)
                .min(self.max_scroll()),
        };
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.max_scroll();
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// `max(0, total_lines - visible_lines + 1)`
    pub fn max_scroll(&self) -> usize {
        if self.content.is_empty() {
            return 0;
        }
        (self.content.len() + 1).saturating_sub(self.visible_result_count())
    }

    pub fn total_result_lines(&self) -> usize {
        self.content.len()
    }

    /// Lines available to results content
    pub fn visible_result_count(&self) -> usize {
        self.regions.results.len()
    }

    /// Slice of content to paint in the results region
    pub fn visible_result_lines(&self) -> &[String] {
        let start = self.scroll_offset.min(self.content.len());
        let end = (start + self.visible_result_count()).min(self.content.len());
        &self.content[start..end]
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}
