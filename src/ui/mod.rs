//! Text user interface
//!
//! `render` builds frames from console state; `terminal` owns the tty.

pub mod render;
pub mod terminal;

pub use render::{render, Frame};
pub use terminal::{run, terminal_size, TerminalSession};
