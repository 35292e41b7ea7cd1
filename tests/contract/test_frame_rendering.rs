//! Contract Tests for Frame Rendering
//!
//! Frames are plain text grids, so the whole screen can be asserted on
//! without a terminal.

use std::path::PathBuf;
use std::time::Duration;

use tokio::runtime::Handle;
use unicode_width::UnicodeWidthStr;
use tview::models::{Action, Mode};
use tview::registry::{ActionEntry, ActionScope};
use tview::ui::render;
use tview::{CommandRegistry, Console, EnvConfigLocator, ExecutionEngine, LayoutEngine};

fn console_with(registry: CommandRegistry, width: usize, height: usize) -> Console {
    Console::new(
        registry,
        ExecutionEngine::new(Handle::current()),
        LayoutEngine::new(width, height),
        EnvConfigLocator::new(PathBuf::from("/tmp/env")),
    )
}

fn two_action_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    registry.register_command("first", "true");
    registry.register_command("second", "true");
    for id in ["first", "second"] {
        registry.add_action(ActionEntry::new(
            Mode::Toml,
            ActionScope::All,
            Action::new(id, id, "test action"),
        ));
    }
    registry
}

#[tokio::test]
async fn test_frame_has_exactly_height_lines() {
    for height in [9, 17, 24, 40] {
        let mut console = console_with(CommandRegistry::with_defaults(), 80, height);
        let frame = console.frame();
        assert_eq!(frame.height(), height);
    }
}

#[tokio::test]
async fn test_lines_are_truncated_to_width() {
    let mut console = console_with(CommandRegistry::with_defaults(), 20, 24);
    console.run_command_line("commands");
    let frame = console.frame();
    assert!(frame.lines.iter().all(|l| l.width() <= 20));
}

/// Wide, tabbed and escape-laden output stays within its row
#[tokio::test]
async fn test_command_output_fits_terminal_columns() {
    let mut registry = two_action_registry();
    registry.register_command(
        "wide",
        r"printf '日本語のファイルシステム使用量\ta\tb\033[2Jc\r\n'",
    );
    let mut console = console_with(registry, 24, 24);

    console.run_command("wide", "local");
    let record = console
        .engine()
        .wait_for_completion("wide:local", Duration::from_secs(10))
        .await
        .unwrap();
    assert!(record.result.as_deref().unwrap_or_default().contains('日'));
    console.tick();

    let frame = console.frame();
    assert_eq!(frame.height(), 24);
    assert!(frame.contains("日本語"));
    for line in &frame.lines {
        assert!(line.width() <= 24, "{:?} is wider than the terminal", line);
        assert!(!line.contains('\x1b'));
        assert!(!line.contains('\t'));
    }
}

#[tokio::test]
async fn test_header_brackets_active_mode_and_environment() {
    let mut console = console_with(CommandRegistry::with_defaults(), 120, 24);
    let frame = console.frame();
    assert!(frame.line(1).unwrap().contains("[TOML]"));
    assert!(frame.line(1).unwrap().contains(" TKM "));
    assert!(frame.line(2).unwrap().contains("[local]"));
    assert!(frame.line(3).unwrap().starts_with('─'));
}

/// Index 3 in a two-action list highlights the last action
#[tokio::test]
async fn test_out_of_range_selection_is_clamped_before_render() {
    let mut console = console_with(two_action_registry(), 80, 24);
    console.navigation_mut().set_item_index(3);

    let frame = console.frame();
    assert_eq!(console.navigation().item_index(), 1);

    let row = frame.highlight.unwrap();
    assert!(frame.line(row).unwrap().starts_with("> · second"));
    assert!(frame.line(row - 1).unwrap().starts_with("  · first"));
}

#[tokio::test]
async fn test_empty_action_list_shows_help() {
    let mut console = console_with(CommandRegistry::new(), 80, 24);
    let frame = console.frame();
    let row = frame.highlight.unwrap();
    assert!(frame.line(row).unwrap().contains("Help"));
}

#[tokio::test]
async fn test_list_window_follows_selection() {
    let mut registry = CommandRegistry::new();
    for i in 0..30 {
        let id = format!("cmd{:02}", i);
        registry.register_command(&id, "true");
        registry.add_action(ActionEntry::new(
            Mode::Toml,
            ActionScope::All,
            Action::new(&id, &id, ""),
        ));
    }
    let mut console = console_with(registry, 80, 17);
    console.navigation_mut().set_item_index(25);

    let frame = console.frame();
    let row = frame.highlight.unwrap();
    assert!(row < 17 - 3);
    assert!(frame.line(row).unwrap().contains("cmd25"));
    assert!(!frame.contains("cmd00"));
}

#[tokio::test]
async fn test_status_area_shows_command_input() {
    let mut console = console_with(CommandRegistry::with_defaults(), 80, 24);
    console.handle_key(tview::Key::Char('/'));
    console.handle_key(tview::Key::Char('t'));

    let frame = console.frame();
    assert_eq!(frame.line(22), Some("/t_"));
    assert!(frame.line(23).unwrap().contains("run:0"));
}

#[tokio::test]
async fn test_render_is_read_only() {
    let mut console = console_with(two_action_registry(), 80, 24);
    console.frame();
    let before = render::render(&console);
    let after = render::render(&console);
    assert_eq!(before, after);
}
