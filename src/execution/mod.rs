//! Asynchronous command execution engine
//!
//! Launches registry commands out-of-band and tracks one lifecycle record
//! per `(command, environment)` pair. The foreground loop never awaits a
//! launch: it polls records by key on each redraw.
//!
//! ## Lifecycle
//!
//! ```text
//!            start                 exit 0
//!   Idle ───────────▶ Executing ───────────▶ Success
//!    ▲                  │    │    exit != 0
//!    │      cancel      │    └─────────────▶ Error
//!    └──────────────────┘
//! ```
//!
//! Each launch gets a generation number. A background task only writes to
//! its record while the record's process handle carries the same
//! generation, so output from a cancelled run is dropped.

pub mod connectivity;
pub mod signals;

use std::collections::HashMap;
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::models::{execution_id, Environment, ExecutionRecord, ExecutionState, ProcessHandle};
use crate::registry::{shell_quote, CommandRegistry};

pub use connectivity::ConnectivityReport;

/// Exit code recorded when the shell itself could not be launched
pub const LAUNCH_FAILURE_EXIT_CODE: i32 = 127;

/// Execution engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Shell used to interpret invocations
    pub shell: PathBuf,
    /// Bounded wait for connectivity checks
    pub connectivity_timeout: Duration,
    /// Command sent through a prefix to check connectivity
    pub roundtrip_command: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shell: PathBuf::from("sh"),
            connectivity_timeout: Duration::from_secs(5),
            roundtrip_command: "echo ok".to_string(),
        }
    }
}

/// Counters over the life of the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStatistics {
    pub started: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
}

type RecordTable = Arc<Mutex<HashMap<String, ExecutionRecord>>>;

/// Background command runner with per-id lifecycle tracking
#[derive(Clone)]
pub struct ExecutionEngine {
    records: RecordTable,
    statistics: Arc<Mutex<EngineStatistics>>,
    next_generation: Arc<AtomicU64>,
    runtime: Handle,
    config: EngineConfig,
}

impl ExecutionEngine {
    /// Create an engine that spawns work on `runtime`
    pub fn new(runtime: Handle) -> Self {
        Self::with_config(runtime, EngineConfig::default())
    }

    pub fn with_config(runtime: Handle, config: EngineConfig) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            statistics: Arc::new(Mutex::new(EngineStatistics::default())),
            next_generation: Arc::new(AtomicU64::new(0)),
            runtime,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runtime background work is spawned on
    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }

    /// Launch `command_name` on `environment` and return its execution id.
    ///
    /// Resolution errors are returned before anything is launched. Once
    /// this returns `Ok`, runtime failures only show up in the record.
    pub fn start(
        &self,
        registry: &CommandRegistry,
        command_name: &str,
        environment: &str,
    ) -> Result<String> {
        let invocation = registry.build_invocation(command_name, environment)?;
        let id = execution_id(command_name, environment);

        let mut records = lock(&self.records);
        let record = records
            .entry(id.clone())
            .or_insert_with(|| ExecutionRecord::new(command_name, environment));
        if record.is_running() {
            return Err(Error::AlreadyRunning { execution_id: id });
        }

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        match self.spawn_child(&invocation) {
            Ok(child) => {
                let pid = child.id().unwrap_or(0);
                record.mark_executing(ProcessHandle { pid, generation });
                drop(records);
                lock(&self.statistics).started += 1;
                info!("Started {} (pid {}): {}", id, pid, invocation);

                self.runtime.spawn(capture_output(
                    child,
                    Arc::clone(&self.records),
                    Arc::clone(&self.statistics),
                    id.clone(),
                    generation,
                ));
            }
            Err(e) => {
                error!("Failed to launch {}: {}", id, e);
                record.mark_completed(e.to_string(), LAUNCH_FAILURE_EXIT_CODE);
                drop(records);
                let mut stats = lock(&self.statistics);
                stats.started += 1;
                stats.failed += 1;
            }
        }

        Ok(id)
    }

    fn spawn_child(&self, invocation: &str) -> Result<Child> {
        let _guard = self.runtime.enter();
        Command::new(&self.config.shell)
            .arg("-c")
            .arg(invocation)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0)
            .spawn()
            .map_err(|e| Error::CommandSpawnFailed {
                command: invocation.to_string(),
                reason: e.to_string(),
            })
    }

    /// Stop a running execution and return its record to idle.
    ///
    /// Best-effort: SIGTERM is sent to the process group and this returns
    /// without waiting for the process to exit.
    pub fn cancel(&self, execution_id: &str) -> Result<()> {
        let handle = {
            let mut records = lock(&self.records);
            let record = records
                .get_mut(execution_id)
                .filter(|r| r.process.is_some())
                .ok_or_else(|| Error::NotRunning {
                    execution_id: execution_id.to_string(),
                })?;
            record.mark_cancelled()
        };
        lock(&self.statistics).cancelled += 1;

        if let Some(handle) = handle {
            info!("Cancelled {} (pid {})", execution_id, handle.pid);
            if let Err(e) = signals::terminate_group(handle.pid) {
                warn!("Cancel of {} could not signal pid {}: {}", execution_id, handle.pid, e);
            }
        }
        Ok(())
    }

    /// Cancel every executing id for `environment`; returns how many
    pub fn cancel_all(&self, environment: &str) -> usize {
        let ids: Vec<String> = lock(&self.records)
            .iter()
            .filter(|(_, r)| r.environment == environment && r.is_running())
            .map(|(id, _)| id.clone())
            .collect();

        ids.iter().filter(|id| self.cancel(id).is_ok()).count()
    }

    /// Snapshot of a record, creating an idle one on first reference
    pub fn record(&self, execution_id: &str) -> ExecutionRecord {
        let mut records = lock(&self.records);
        records
            .entry(execution_id.to_string())
            .or_insert_with(|| {
                let (command, environment) = split_execution_id(execution_id);
                ExecutionRecord::new(command, environment)
            })
            .clone()
    }

    /// Snapshot without creating a record
    pub fn peek(&self, execution_id: &str) -> Option<ExecutionRecord> {
        lock(&self.records).get(execution_id).cloned()
    }

    pub fn state(&self, execution_id: &str) -> ExecutionState {
        self.peek(execution_id)
            .map(|r| r.state)
            .unwrap_or_default()
    }

    /// Flip the inline-expansion flag; returns the new value
    pub fn toggle_expanded(&self, execution_id: &str) -> bool {
        let mut records = lock(&self.records);
        let record = records
            .entry(execution_id.to_string())
            .or_insert_with(|| {
                let (command, environment) = split_execution_id(execution_id);
                ExecutionRecord::new(command, environment)
            });
        record.expanded = !record.expanded;
        record.expanded
    }

    /// Ids currently executing, sorted
    pub fn executing_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = lock(&self.records)
            .iter()
            .filter(|(_, r)| r.is_running())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn statistics(&self) -> EngineStatistics {
        *lock(&self.statistics)
    }

    /// Poll until `execution_id` is no longer executing, or `limit` passes
    pub async fn wait_for_completion(
        &self,
        execution_id: &str,
        limit: Duration,
    ) -> Option<ExecutionRecord> {
        let deadline = tokio::time::Instant::now() + limit;
        loop {
            let record = self.peek(execution_id)?;
            if !record.is_running() {
                return Some(record);
            }
            if tokio::time::Instant::now() >= deadline {
                return None;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    /// Round-trip check for one environment. Local always passes.
    pub async fn test_connectivity(
        &self,
        registry: &CommandRegistry,
        environment: &str,
    ) -> Result<()> {
        match self.probe_invocation(registry, environment)? {
            None => Ok(()),
            Some(invocation) => {
                connectivity::probe(
                    &self.config.shell,
                    environment,
                    &invocation,
                    self.config.connectivity_timeout,
                )
                .await
            }
        }
    }

    /// Check every registered environment concurrently
    pub async fn test_all_connectivity(&self, registry: &CommandRegistry) -> ConnectivityReport {
        let environments = registry.environments().to_vec();
        let mut slots: Vec<Option<Result<()>>> = Vec::with_capacity(environments.len());
        let mut set = JoinSet::new();

        for (index, env) in environments.iter().enumerate() {
            match self.probe_invocation(registry, env.name()) {
                Ok(None) => slots.push(Some(Ok(()))),
                Err(e) => slots.push(Some(Err(e))),
                Ok(Some(invocation)) => {
                    slots.push(None);
                    let shell = self.config.shell.clone();
                    let limit = self.config.connectivity_timeout;
                    let name = env.name().to_string();
                    set.spawn(async move {
                        let result = connectivity::probe(&shell, &name, &invocation, limit).await;
                        (index, result)
                    });
                }
            }
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => error!("Connectivity task failed: {}", e),
            }
        }

        let results = environments
            .into_iter()
            .zip(slots)
            .map(|(env, slot)| {
                let result = slot.unwrap_or_else(|| {
                    Err(Error::ConnectivityFailure {
                        environment: env.name().to_string(),
                        reason: "check did not complete".to_string(),
                    })
                });
                (env, result)
            })
            .collect();

        ConnectivityReport { results }
    }

    fn probe_invocation(
        &self,
        registry: &CommandRegistry,
        environment: &str,
    ) -> Result<Option<String>> {
        if Environment::from(environment).is_local() {
            return Ok(None);
        }
        let prefix = registry.resolve_prefix(environment)?;
        Ok(Some(format!(
            "{} {}",
            prefix,
            shell_quote(&self.config.roundtrip_command)
        )))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn split_execution_id(execution_id: &str) -> (&str, &str) {
    execution_id
        .rsplit_once(':')
        .unwrap_or((execution_id, ""))
}

fn exit_code_of(status: ExitStatus) -> i32 {
    status
        .code()
        .or_else(|| status.signal().map(|signo| 128 + signo))
        .unwrap_or(-1)
}

/// Read `reader` line by line into `tx`
async fn forward_lines<R>(reader: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let mut line = String::from_utf8_lossy(&buf).into_owned();
                if !line.ends_with('\n') {
                    line.push('\n');
                }
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                debug!("Output stream closed: {}", e);
                break;
            }
        }
    }
}

/// Collect merged output, wait for exit and publish the outcome
async fn capture_output(
    mut child: Child,
    records: RecordTable,
    statistics: Arc<Mutex<EngineStatistics>>,
    id: String,
    generation: u64,
) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(forward_lines(stdout, tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(forward_lines(stderr, tx.clone()));
    }
    drop(tx);

    let mut output = String::new();
    while let Some(line) = rx.recv().await {
        {
            let mut records = lock(&records);
            if let Some(record) = records
                .get_mut(&id)
                .filter(|r| r.process.map(|p| p.generation) == Some(generation))
            {
                record.live_output.push_str(&line);
            }
        }
        output.push_str(&line);
    }

    let exit_code = match child.wait().await {
        Ok(status) => exit_code_of(status),
        Err(e) => {
            output.push_str(&format!("failed to wait for process: {}\n", e));
            -1
        }
    };
    let trimmed = output.trim_end_matches('\n').len();
    output.truncate(trimmed);

    let mut records = lock(&records);
    match records
        .get_mut(&id)
        .filter(|r| r.process.map(|p| p.generation) == Some(generation))
    {
        Some(record) => {
            record.mark_completed(output, exit_code);
            drop(records);
            let mut stats = lock(&statistics);
            if exit_code == 0 {
                stats.succeeded += 1;
            } else {
                stats.failed += 1;
            }
            info!("{} finished with exit code {}", id, exit_code);
        }
        None => {
            debug!(
                "Discarding output of cancelled run {} (generation {})",
                id, generation
            );
        }
    }
}
