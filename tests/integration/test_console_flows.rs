//! Integration Tests for Console Flows
//!
//! Drives the console the way the terminal loop does: keys in, ticks
//! between, frames out.

use std::path::PathBuf;
use std::time::Duration;

use tokio::runtime::Handle;
use tview::console::{InputMode, StatusLevel};
use tview::models::{ExecutionState, Mode};
use tview::{Console, ConsoleAction, EnvConfigLocator, ExecutionEngine, Key, LayoutEngine};
use tview::CommandRegistry;

fn console() -> Console {
    let mut registry = CommandRegistry::with_defaults();
    registry.register_command("whoami", "echo operator");
    registry.register_command("uptime", "sleep 5");
    Console::new(
        registry,
        ExecutionEngine::new(Handle::current()),
        LayoutEngine::new(100, 30),
        EnvConfigLocator::new(PathBuf::from("/srv/tview/env")),
    )
}

fn type_command(console: &mut Console, line: &str) {
    console.handle_key(Key::Char('/'));
    for c in line.chars() {
        console.handle_key(Key::Char(c));
    }
    console.handle_key(Key::Enter);
}

/// Tick until `done` holds or two seconds pass
async fn settle(console: &mut Console, done: impl Fn(&Console) -> bool) -> bool {
    for _ in 0..100 {
        console.tick();
        if done(console) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_run_command_streams_into_results() {
    let mut console = console();
    type_command(&mut console, "run whoami");
    assert_eq!(console.focused(), Some("whoami:local"));
    assert!(console.layout().results_visible());

    let finished = settle(&mut console, |c| {
        c.engine().state("whoami:local") == ExecutionState::Success
    })
    .await;
    assert!(finished);
    console.tick();

    let frame = console.frame();
    assert!(frame.contains("operator"));
    assert_eq!(console.status().text, "whoami:local succeeded");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_execute_selected_in_rcm_mode() {
    let mut console = console();
    type_command(&mut console, "mode RCM");
    assert_eq!(console.navigation().mode(), Mode::Rcm);

    // disk_usage, memory, uptime, top_processes, whoami
    for _ in 0..4 {
        console.handle_key(Key::Char('k'));
    }
    assert_eq!(console.selected_execution_id().as_deref(), Some("whoami:local"));
    console.handle_key(Key::Char('l'));

    assert!(settle(&mut console, |c| c.engine().state("whoami:local").glyph() == '✓').await);
    let frame = console.frame();
    assert!(frame.contains("✓"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_selected_running_command() {
    let mut console = console();
    type_command(&mut console, "mode RCM");
    console.handle_key(Key::Down);
    console.handle_key(Key::Down);
    assert_eq!(console.selected_execution_id().as_deref(), Some("uptime:local"));

    console.handle_key(Key::Enter);
    assert_eq!(console.engine().state("uptime:local"), ExecutionState::Executing);
    assert!(console.frame().contains("…"));

    console.handle_key(Key::Char('c'));
    assert_eq!(console.engine().state("uptime:local"), ExecutionState::Idle);
    assert_eq!(console.status().text, "Cancelled uptime:local");

    console.handle_key(Key::Char('c'));
    assert_eq!(console.status().level, StatusLevel::Error);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_mode_and_environment_keys_stop_at_ends() {
    let mut console = console();
    console.handle_key(Key::Left);
    assert_eq!(console.navigation().mode(), Mode::Toml);

    for _ in 0..Mode::ALL.len() + 1 {
        console.handle_key(Key::Char('m'));
    }
    assert_eq!(console.navigation().mode(), Mode::Org);
    console.handle_key(Key::Right);
    assert_eq!(console.navigation().mode(), Mode::Org);

    console.handle_key(Key::Char('E'));
    assert!(console.navigation().environment().is_local());
    console.handle_key(Key::Char('e'));
    assert_eq!(console.navigation().environment().name(), "dev");
    for _ in 0..10 {
        console.handle_key(Key::Char('e'));
    }
    assert_eq!(console.navigation().environment().name(), "qa");

    console.handle_key(Key::Char('r'));
    assert_eq!(console.navigation().mode(), Mode::Toml);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_remote_run_without_prefix_reports_not_configured() {
    let mut console = console();
    type_command(&mut console, "env dev");
    type_command(&mut console, "run whoami");

    assert_eq!(console.status().level, StatusLevel::Error);
    assert!(console.status().text.contains("dev"));
    assert!(console.engine().peek("whoami:dev").is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_prefix_then_connectivity() {
    let mut console = console();
    type_command(&mut console, "prefix dev sh -c");
    type_command(&mut console, "test dev");
    assert!(console.connectivity_pending());

    assert!(settle(&mut console, |c| !c.connectivity_pending()).await);
    assert_eq!(console.status().text, "Connectivity ok");
    assert!(console.frame().contains("dev"));

    type_command(&mut console, "reset dev");
    type_command(&mut console, "test dev");
    assert!(settle(&mut console, |c| !c.connectivity_pending()).await);
    assert_eq!(console.status().level, StatusLevel::Error);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_detail_view_and_back() {
    let mut console = console();
    type_command(&mut console, "mode RCM");
    for _ in 0..4 {
        console.handle_key(Key::Down);
    }
    console.handle_key(Key::Enter);
    assert!(settle(&mut console, |c| c.engine().state("whoami:local") == ExecutionState::Success).await);

    console.handle_key(Key::Char('o'));
    assert!(console.frame().contains("detail whoami:local"));

    console.handle_key(Key::Char('j'));
    assert!(!console.frame().contains("detail"));
    assert!(console.layout().results_visible());

    console.handle_key(Key::Char('j'));
    assert!(!console.layout().results_visible());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_space_expands_inline_output() {
    let mut console = console();
    type_command(&mut console, "mode RCM");
    for _ in 0..4 {
        console.handle_key(Key::Down);
    }
    console.handle_key(Key::Enter);
    assert!(settle(&mut console, |c| c.engine().state("whoami:local") == ExecutionState::Success).await);
    type_command(&mut console, "clear");

    console.handle_key(Key::Char(' '));
    let frame = console.frame();
    assert!(frame.lines.iter().any(|l| l.starts_with("      operator")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_command_input_and_quit() {
    let mut console = console();
    console.handle_key(Key::Char('/'));
    assert!(matches!(console.input(), InputMode::Command(_)));
    console.handle_key(Key::Esc);
    assert_eq!(console.input(), &InputMode::Normal);

    type_command(&mut console, "commands");
    assert!(console.frame().contains("disk_usage"));

    assert_eq!(console.handle_key(Key::Char('q')), ConsoleAction::Quit);
}
