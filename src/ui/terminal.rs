//! Terminal backend
//!
//! Raw-mode session, frame painting and the foreground loop. Everything
//! here talks to the tty; the console and renderer do not.

use std::env;
use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use tracing::{debug, info};

use super::render::Frame;
use crate::console::{Console, ConsoleAction, Key};
use crate::layout::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// Alternate-screen raw-mode session; restores the terminal on drop
pub struct TerminalSession {
    stdout: Stdout,
}

impl TerminalSession {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            Hide,
            Clear(ClearType::All),
            MoveTo(0, 0)
        )?;
        Ok(Self { stdout })
    }

    /// Paint a frame, clipped to `rows` terminal rows
    pub fn paint(&mut self, frame: &Frame, rows: usize) -> io::Result<()> {
        paint_frame(&mut self.stdout, frame, rows)
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(
            self.stdout,
            SetAttribute(Attribute::Reset),
            LeaveAlternateScreen,
            Show,
            MoveTo(0, 0)
        );
        let _ = terminal::disable_raw_mode();
    }
}

fn paint_frame<W: Write>(out: &mut W, frame: &Frame, rows: usize) -> io::Result<()> {
    queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;

    for (row, line) in frame.lines.iter().enumerate().take(rows) {
        queue!(out, MoveTo(0, to_u16(row)))?;
        if frame.highlight == Some(row) {
            queue!(
                out,
                SetAttribute(Attribute::Reverse),
                Print(line),
                SetAttribute(Attribute::Reset)
            )?;
        } else if frame.status_is_error && row + 2 == frame.height() {
            queue!(
                out,
                SetForegroundColor(Color::Red),
                Print(line),
                ResetColor
            )?;
        } else {
            queue!(out, Print(line))?;
        }
    }

    out.flush()
}

fn to_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

/// Terminal size as `(width, height)`: the tty, then `COLUMNS`/`LINES`,
/// then 80x24
pub fn terminal_size() -> (usize, usize) {
    match terminal::size() {
        Ok((width, height)) if width > 0 && height > 0 => {
            (usize::from(width), usize::from(height))
        }
        _ => (
            env_dimension("COLUMNS").unwrap_or(DEFAULT_WIDTH),
            env_dimension("LINES").unwrap_or(DEFAULT_HEIGHT),
        ),
    }
}

fn env_dimension(name: &str) -> Option<usize> {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|v| *v > 0)
}

/// Translate a crossterm key event
pub fn map_key(key_event: KeyEvent) -> Option<Key> {
    if !matches!(key_event.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return None;
    }

    if key_event.modifiers.contains(KeyModifiers::CONTROL) {
        return match key_event.code {
            KeyCode::Char('c') => Some(Key::Interrupt),
            _ => None,
        };
    }

    let key = match key_event.code {
        KeyCode::Char(ch) => Key::Char(ch),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Esc,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        _ => return None,
    };
    Some(key)
}

/// Foreground loop: render, wait up to `tick` for one event, apply it
pub fn run(console: &mut Console, tick: Duration) -> io::Result<()> {
    let mut session = TerminalSession::enter()?;
    let (width, mut rows) = terminal_size();
    console.resize(width, rows);
    info!("Console started at {}x{}", width, rows);

    loop {
        console.tick();
        let frame = console.frame();
        session.paint(&frame, rows)?;

        if !event::poll(tick)? {
            continue;
        }

        match event::read()? {
            Event::Resize(width, height) => {
                rows = usize::from(height);
                console.resize(usize::from(width), rows);
                debug!("Resized to {}x{}", width, height);
            }
            Event::Key(key_event) => {
                if let Some(key) = map_key(key_event) {
                    if console.handle_key(key) == ConsoleAction::Quit {
                        break;
                    }
                }
            }
            _ => {}
        }
    }

    info!("Console stopped");
    Ok(())
}
