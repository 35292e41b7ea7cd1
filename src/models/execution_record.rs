//! Execution Record Model
//!
//! Per-(command, environment) lifecycle state tracked by the execution
//! engine. A record is created idle the first time its key is referenced
//! and lives for the rest of the process.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Lifecycle state of an execution record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ExecutionState {
    /// Never run, or cancelled
    #[default]
    Idle,
    /// Background process is running
    Executing,
    /// Last run exited with code 0
    Success,
    /// Last run exited non-zero or could not be launched
    Error,
}

impl ExecutionState {
    /// Single-character glyph used by the action list
    pub fn glyph(&self) -> char {
        match self {
            ExecutionState::Idle => '·',
            ExecutionState::Executing => '…',
            ExecutionState::Success => '✓',
            ExecutionState::Error => '✗',
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionState::Idle => "idle",
            ExecutionState::Executing => "executing",
            ExecutionState::Success => "success",
            ExecutionState::Error => "error",
        }
    }
}

/// Handle to a live background process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessHandle {
    /// Child pid; also the process group id
    pub pid: u32,
    /// Launch generation, used to discard output from cancelled runs
    pub generation: u64,
}

/// Build the record key for a command on an environment
pub fn execution_id(command_name: &str, environment: &str) -> String {
    format!("{}:{}", command_name, environment)
}

/// Lifecycle record for one (command, environment) pair
#[derive(Debug, Clone, Default)]
pub struct ExecutionRecord {
    /// Registry command name
    pub command_name: String,
    /// Environment name
    pub environment: String,
    /// Current lifecycle state
    pub state: ExecutionState,
    /// Merged stdout/stderr of the last completed run
    pub result: Option<String>,
    /// Exit code of the last completed run
    pub exit_code: Option<i32>,
    /// Completion time of the last run
    pub timestamp: Option<DateTime<Local>>,
    /// Start time of the current or last run
    pub started_at: Option<DateTime<Local>>,
    /// Output captured so far while executing
    pub live_output: String,
    /// Present only while executing
    pub process: Option<ProcessHandle>,
    /// Renderer flag: show captured output inline
    pub expanded: bool,
}

impl ExecutionRecord {
    /// Create an idle record
    pub fn new(command_name: &str, environment: &str) -> Self {
        Self {
            command_name: command_name.to_string(),
            environment: environment.to_string(),
            ..Default::default()
        }
    }

    /// Record key
    pub fn id(&self) -> String {
        execution_id(&self.command_name, &self.environment)
    }

    /// Mark the record as launched
    pub fn mark_executing(&mut self, handle: ProcessHandle) {
        self.state = ExecutionState::Executing;
        self.result = None;
        self.exit_code = None;
        self.timestamp = None;
        self.live_output.clear();
        self.started_at = Some(Local::now());
        self.process = Some(handle);
    }

    /// Store the outcome of a finished run
    pub fn mark_completed(&mut self, output: String, exit_code: i32) {
        self.state = if exit_code == 0 {
            ExecutionState::Success
        } else {
            ExecutionState::Error
        };
        self.result = Some(output);
        self.exit_code = Some(exit_code);
        self.timestamp = Some(Local::now());
        self.live_output.clear();
        self.process = None;
    }

    /// Return to idle, dropping any captured result
    pub fn mark_cancelled(&mut self) -> Option<ProcessHandle> {
        self.state = ExecutionState::Idle;
        self.result = None;
        self.exit_code = None;
        self.timestamp = None;
        self.live_output.clear();
        self.process.take()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, ExecutionState::Executing)
    }

    /// Whether the last run finished (successfully or not)
    pub fn is_settled(&self) -> bool {
        matches!(self.state, ExecutionState::Success | ExecutionState::Error)
    }

    /// Text to show for this record: live output while running, else result
    pub fn display_output(&self) -> &str {
        if self.is_running() {
            &self.live_output
        } else {
            self.result.as_deref().unwrap_or("")
        }
    }

    /// Convert a settled record into a `Result`, for scripted callers
    pub fn check(&self) -> Result<()> {
        match (self.state, self.exit_code) {
            (ExecutionState::Error, code) => Err(Error::RuntimeFailure {
                execution_id: self.id(),
                exit_code: code.unwrap_or(-1),
            }),
            _ => Ok(()),
        }
    }

    /// Elapsed run time in whole seconds, if started
    pub fn elapsed_seconds(&self) -> Option<i64> {
        let started = self.started_at?;
        let end = self.timestamp.unwrap_or_else(Local::now);
        Some((end - started).num_seconds().max(0))
    }
}
