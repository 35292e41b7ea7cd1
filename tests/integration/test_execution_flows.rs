//! Integration Tests for Background Command Execution
//!
//! These tests launch real shell commands through the execution engine
//! and observe the lifecycle records the console polls.

use std::time::Duration;

use tokio::runtime::Handle;
use tview::error::Error;
use tview::models::ExecutionState;
use tview::{CommandRegistry, ExecutionEngine};

const WAIT: Duration = Duration::from_secs(10);

fn engine() -> ExecutionEngine {
    ExecutionEngine::new(Handle::current())
}

fn registry() -> CommandRegistry {
    let mut registry = CommandRegistry::with_defaults();
    registry.register_command("nap", "sleep 5");
    registry.register_command("fail", "echo broken >&2; exit 3");
    registry.register_command("quoted", "echo 'quoted text'");
    registry.register_command("chatty", "echo early; sleep 5; echo late");
    registry
}

/// Local disk usage runs to success with filesystem text
#[tokio::test]
async fn test_disk_usage_on_local() {
    let engine = engine();
    let registry = registry();

    let id = engine.start(&registry, "disk_usage", "local").unwrap();
    assert_eq!(id, "disk_usage:local");

    let record = engine.wait_for_completion(&id, WAIT).await.unwrap();
    assert_eq!(record.state, ExecutionState::Success);
    assert_eq!(record.exit_code, Some(0));
    assert!(record.timestamp.is_some());
    assert!(record
        .result
        .as_deref()
        .unwrap_or_default()
        .contains("Filesystem"));
}

#[tokio::test]
async fn test_nonzero_exit_records_error() {
    let engine = engine();
    let registry = registry();

    let id = engine.start(&registry, "fail", "local").unwrap();
    let record = engine.wait_for_completion(&id, WAIT).await.unwrap();

    assert_eq!(record.state, ExecutionState::Error);
    assert_eq!(record.exit_code, Some(3));
    assert_eq!(record.result.as_deref(), Some("broken"));
    assert!(matches!(
        record.check(),
        Err(Error::RuntimeFailure { exit_code: 3, .. })
    ));
    assert_eq!(engine.statistics().failed, 1);
}

#[tokio::test]
async fn test_second_start_while_running_is_rejected() {
    let engine = engine();
    let registry = registry();

    let id = engine.start(&registry, "nap", "local").unwrap();
    assert_eq!(engine.state(&id), ExecutionState::Executing);

    let err = engine.start(&registry, "nap", "local").unwrap_err();
    assert!(matches!(err, Error::AlreadyRunning { ref execution_id } if execution_id == "nap:local"));

    engine.cancel(&id).unwrap();
}

#[tokio::test]
async fn test_cancel_returns_record_to_idle() {
    let engine = engine();
    let registry = registry();

    let id = engine.start(&registry, "chatty", "local").unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    engine.cancel(&id).unwrap();
    let record = engine.record(&id);
    assert_eq!(record.state, ExecutionState::Idle);
    assert_eq!(record.result, None);
    assert_eq!(record.exit_code, None);
    assert!(record.process.is_none());

    // The killed run finishes in the background; its output is dropped
    tokio::time::sleep(Duration::from_millis(500)).await;
    let record = engine.record(&id);
    assert_eq!(record.state, ExecutionState::Idle);
    assert_eq!(record.result, None);
    assert!(!record.live_output.contains("late"));
    assert_eq!(engine.statistics().cancelled, 1);
}

#[tokio::test]
async fn test_restart_after_cancel_uses_new_run() {
    let engine = engine();
    let mut registry = registry();

    let id = engine.start(&registry, "chatty", "local").unwrap();
    engine.cancel(&id).unwrap();

    registry.register_command("chatty", "echo second run");
    let id = engine.start(&registry, "chatty", "local").unwrap();
    let record = engine.wait_for_completion(&id, WAIT).await.unwrap();

    assert_eq!(record.state, ExecutionState::Success);
    assert_eq!(record.result.as_deref(), Some("second run"));
}

#[tokio::test]
async fn test_remote_prefix_receives_quoted_command() {
    let engine = engine();
    let mut registry = registry();
    registry.set_prefix("dev", "sh -c");

    let id = engine.start(&registry, "quoted", "dev").unwrap();
    assert_eq!(id, "quoted:dev");

    let record = engine.wait_for_completion(&id, WAIT).await.unwrap();
    assert_eq!(record.state, ExecutionState::Success);
    assert_eq!(record.result.as_deref(), Some("quoted text"));
}

#[tokio::test]
async fn test_same_command_on_two_environments_runs_in_parallel() {
    let engine = engine();
    let mut registry = registry();
    registry.set_prefix("dev", "sh -c");

    let local = engine.start(&registry, "nap", "local").unwrap();
    let dev = engine.start(&registry, "nap", "dev").unwrap();

    assert_ne!(local, dev);
    assert_eq!(engine.executing_ids(), vec![dev.clone(), local.clone()]);

    assert_eq!(engine.cancel_all("dev"), 1);
    assert_eq!(engine.state(&dev), ExecutionState::Idle);
    assert_eq!(engine.state(&local), ExecutionState::Executing);

    assert_eq!(engine.cancel_all("local"), 1);
    assert!(engine.executing_ids().is_empty());
}

#[tokio::test]
async fn test_live_output_accumulates_while_running() {
    let engine = engine();
    let registry = registry();

    let id = engine.start(&registry, "chatty", "local").unwrap();

    let mut seen = false;
    for _ in 0..100 {
        if engine.record(&id).live_output.contains("early") {
            seen = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(seen, "streamed output should appear before completion");
    assert_eq!(engine.state(&id), ExecutionState::Executing);

    engine.cancel(&id).unwrap();
}
