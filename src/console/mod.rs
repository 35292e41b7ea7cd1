//! Console state
//!
//! `Console` owns every piece of session state: the registry, navigation,
//! the execution engine, the layout and the per-environment config
//! locator. The foreground loop feeds it keys and ticks and asks it for
//! frames; it never blocks on a launched command.

pub mod commands;
pub mod keys;

use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::{debug, info, warn};

use crate::config::{ConsoleConfig, EnvConfigLocator};
use crate::error::{Error, Result};
use crate::execution::{ConnectivityReport, ExecutionEngine};
use crate::layout::{LayoutEngine, ScrollDirection};
use crate::models::{execution_id, Action, Environment, ExecutionRecord, ExecutionState};
use crate::navigation::{NavigationState, View};
use crate::registry::actions::{CONFIG_PATH_ACTION_ID, TEST_CONNECTIVITY_ACTION_ID};
use crate::registry::CommandRegistry;
use crate::ui::render::{self, Frame};

pub use commands::{ConsoleCommand, TestTarget};
pub use keys::{ConsoleAction, Key, HELP_TEXT};

/// Whether keys drive navigation or edit the command line
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Command(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

/// One-line message shown in the status area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: StatusLevel::Info,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: StatusLevel::Error,
        }
    }
}

/// The operator console
pub struct Console {
    registry: CommandRegistry,
    navigation: NavigationState,
    engine: ExecutionEngine,
    layout: LayoutEngine,
    env_configs: EnvConfigLocator,
    input: InputMode,
    status: StatusMessage,
    /// Execution whose record feeds the results panel
    focused: Option<String>,
    focused_state: ExecutionState,
    pending_connectivity: Option<oneshot::Receiver<ConnectivityReport>>,
}

impl Console {
    pub fn new(
        registry: CommandRegistry,
        engine: ExecutionEngine,
        layout: LayoutEngine,
        env_configs: EnvConfigLocator,
    ) -> Self {
        let navigation = NavigationState::for_registry(&registry);
        Self {
            registry,
            navigation,
            engine,
            layout,
            env_configs,
            input: InputMode::Normal,
            status: StatusMessage::info("Press / for commands, l to run, q to quit"),
            focused: None,
            focused_state: ExecutionState::Idle,
            pending_connectivity: None,
        }
    }

    /// Console built from a loaded configuration
    pub fn from_config(
        config: &ConsoleConfig,
        runtime: tokio::runtime::Handle,
        width: usize,
        height: usize,
    ) -> Self {
        Self::new(
            config.build_registry(),
            ExecutionEngine::with_config(runtime, config.engine_config()),
            LayoutEngine::new(width, height),
            EnvConfigLocator::from_env(config.env_dir()),
        )
    }

    // === Accessors ===

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn navigation_mut(&mut self) -> &mut NavigationState {
        &mut self.navigation
    }

    pub fn engine(&self) -> &ExecutionEngine {
        &self.engine
    }

    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    pub fn env_configs(&self) -> &EnvConfigLocator {
        &self.env_configs
    }

    pub fn input(&self) -> &InputMode {
        &self.input
    }

    pub fn status(&self) -> &StatusMessage {
        &self.status
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    /// Derived action list for the current mode and environment
    pub fn actions(&self) -> Vec<Action> {
        self.navigation.current_actions(&self.registry)
    }

    /// Execution id behind the highlighted row, if it is a registry command
    pub fn selected_execution_id(&mut self) -> Option<String> {
        let action = self.navigation.selected_action(&self.registry);
        if self.registry.contains_command(&action.id) {
            Some(execution_id(&action.id, self.navigation.environment().name()))
        } else {
            None
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.layout.resize(width, height);
    }

    /// Clamp the selection and render the current state
    pub fn frame(&mut self) -> Frame {
        let len = self.actions().len();
        self.navigation.clamp_to(len);
        render::render(self)
    }

    // === Input ===

    pub fn handle_key(&mut self, key: Key) -> ConsoleAction {
        if key == Key::Interrupt {
            return ConsoleAction::Quit;
        }

        let action = match self.input {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Command(_) => {
                self.handle_command_key(key);
                ConsoleAction::Continue
            }
        };

        let len = self.actions().len();
        self.navigation.clamp_to(len);
        action
    }

    fn handle_normal_key(&mut self, key: Key) -> ConsoleAction {
        let len = self.actions().len();
        match key {
            Key::Char('q') => return ConsoleAction::Quit,
            Key::Char('i') | Key::Up => self.navigation.move_up(len),
            Key::Char('k') | Key::Down => self.navigation.move_down(len),
            Key::Char('m') | Key::Right => self.navigation.next_mode(),
            Key::Char('M') | Key::Left => self.navigation.prev_mode(),
            Key::Char('e') => self.navigation.next_environment(),
            Key::Char('E') => self.navigation.prev_environment(),
            Key::Char('l') | Key::Enter => self.execute_selected(),
            Key::Char('o') => self.open_detail(),
            Key::Char('j') | Key::Esc => self.back(),
            Key::Char('/') => self.input = InputMode::Command(String::new()),
            Key::Char('r') => self.reset_navigation(),
            Key::Char('t') => {
                let env = self.navigation.environment().name().to_string();
                self.start_connectivity(Some(env));
            }
            Key::Char('T') => self.start_connectivity(None),
            Key::Char('c') => self.cancel_selected(),
            Key::Char('C') => {
                let env = self.navigation.environment().name().to_string();
                self.cancel_environment(&env);
            }
            Key::Char(' ') => self.toggle_expanded(),
            Key::PageUp => {
                let page = self.layout.visible_result_count().max(1);
                self.layout.scroll_results(ScrollDirection::Up, page);
            }
            Key::PageDown => {
                let page = self.layout.visible_result_count().max(1);
                self.layout.scroll_results(ScrollDirection::Down, page);
            }
            Key::Home => self.layout.scroll_to_top(),
            Key::End => self.layout.scroll_to_bottom(),
            _ => {}
        }
        ConsoleAction::Continue
    }

    fn handle_command_key(&mut self, key: Key) {
        let InputMode::Command(buffer) = &mut self.input else {
            return;
        };
        match key {
            Key::Char(c) => buffer.push(c),
            Key::Backspace => {
                if buffer.pop().is_none() {
                    self.input = InputMode::Normal;
                }
            }
            Key::Esc => self.input = InputMode::Normal,
            Key::Enter => {
                let line = std::mem::take(buffer);
                self.input = InputMode::Normal;
                if !line.trim().is_empty() {
                    self.run_command_line(&line);
                }
            }
            _ => {}
        }
    }

    // === Actions ===

    /// Run the highlighted action on the current environment
    pub fn execute_selected(&mut self) {
        let action = self.navigation.selected_action(&self.registry);
        let environment = self.navigation.environment().name().to_string();

        match action.id.as_str() {
            _ if action.is_help() => self.show_help(),
            CONFIG_PATH_ACTION_ID => {
                let path = self.env_configs.set_active_config_for(&environment);
                let exists = if path.is_file() { "yes" } else { "no" };
                self.show_text(&format!(
                    "Active config for {}\n  {}\n  exists: {}",
                    environment,
                    path.display(),
                    exists
                ));
                self.set_status(StatusMessage::info(format!(
                    "Active config: {}",
                    path.display()
                )));
            }
            TEST_CONNECTIVITY_ACTION_ID => self.start_connectivity(Some(environment)),
            command => self.run_command(command, &environment),
        }
    }

    /// Launch a registry command and focus the results panel on it
    pub fn run_command(&mut self, command: &str, environment: &str) {
        match self.engine.start(&self.registry, command, environment) {
            Ok(id) => {
                self.set_status(StatusMessage::info(format!("Started {}", id)));
                self.focus(id);
                // a fast run may already be settled; still report its outcome
                self.focused_state = ExecutionState::Executing;
            }
            Err(Error::AlreadyRunning { execution_id }) => {
                self.set_status(StatusMessage::error(format!(
                    "{} is already running",
                    execution_id
                )));
                self.focus(execution_id);
            }
            Err(e) => self.set_status(StatusMessage::error(e.to_string())),
        }
    }

    fn open_detail(&mut self) {
        match self.selected_execution_id() {
            Some(id) => {
                self.navigation.push_view(View::Detail(id.clone()));
                self.focus(id);
            }
            None => self.set_status(StatusMessage::info("No record behind this action")),
        }
    }

    /// Leave a detail view, or hide results at the top level
    fn back(&mut self) {
        if self.navigation.pop_view() {
            return;
        }
        if self.layout.results_visible() {
            self.hide_results();
        }
    }

    fn hide_results(&mut self) {
        self.focused = None;
        self.focused_state = ExecutionState::Idle;
        self.layout.hide_results();
    }

    fn reset_navigation(&mut self) {
        self.navigation.reset();
        self.hide_results();
        self.set_status(StatusMessage::info("Navigation reset"));
    }

    fn cancel_selected(&mut self) {
        match self.selected_execution_id() {
            Some(id) => self.cancel(&id),
            None => self.set_status(StatusMessage::error("Nothing to cancel")),
        }
    }

    fn cancel(&mut self, id: &str) {
        match self.engine.cancel(id) {
            Ok(()) => self.set_status(StatusMessage::info(format!("Cancelled {}", id))),
            Err(e) => self.set_status(StatusMessage::error(e.to_string())),
        }
    }

    fn cancel_environment(&mut self, environment: &str) {
        let count = self.engine.cancel_all(environment);
        self.set_status(StatusMessage::info(format!(
            "Cancelled {} command(s) on {}",
            count, environment
        )));
    }

    fn toggle_expanded(&mut self) {
        if let Some(id) = self.selected_execution_id() {
            self.engine.toggle_expanded(&id);
        }
    }

    fn show_help(&mut self) {
        self.focused = None;
        self.layout.show_results(HELP_TEXT);
    }

    fn show_text(&mut self, text: &str) {
        self.focused = None;
        self.layout.show_results(text);
    }

    fn focus(&mut self, id: String) {
        let record = self.engine.record(&id);
        self.focused_state = record.state;
        self.layout.show_results(&describe_record(&record));
        self.focused = Some(id);
    }

    fn set_status(&mut self, status: StatusMessage) {
        if status.level == StatusLevel::Error {
            warn!("{}", status.text);
        }
        self.status = status;
    }

    // === Connectivity ===

    /// Run connectivity checks in the background; `None` checks everything
    pub fn start_connectivity(&mut self, environment: Option<String>) {
        if self.pending_connectivity.is_some() {
            self.set_status(StatusMessage::error("A connectivity test is already running"));
            return;
        }

        let engine = self.engine.clone();
        let registry = self.registry.clone();
        let (tx, rx) = oneshot::channel();
        let label = environment.clone().unwrap_or_else(|| "all environments".to_string());

        self.engine.runtime().spawn(async move {
            let report = match environment {
                Some(env) => {
                    let result = engine.test_connectivity(&registry, &env).await;
                    ConnectivityReport {
                        results: vec![(Environment::from(env.as_str()), result)],
                    }
                }
                None => engine.test_all_connectivity(&registry).await,
            };
            if tx.send(report).is_err() {
                debug!("Connectivity report dropped, console is gone");
            }
        });

        self.pending_connectivity = Some(rx);
        self.set_status(StatusMessage::info(format!("Testing {}...", label)));
    }

    pub fn connectivity_pending(&self) -> bool {
        self.pending_connectivity.is_some()
    }

    fn poll_connectivity(&mut self) {
        let Some(rx) = self.pending_connectivity.as_mut() else {
            return;
        };
        match rx.try_recv() {
            Ok(report) => {
                self.pending_connectivity = None;
                info!(
                    "Connectivity: {} of {} failed",
                    report.failures(),
                    report.results.len()
                );
                self.show_text(&report.summary_lines().join("\n"));
                let status = if report.is_all_ok() {
                    StatusMessage::info("Connectivity ok")
                } else {
                    StatusMessage::error(format!(
                        "Connectivity: {} failure(s)",
                        report.failures()
                    ))
                };
                self.set_status(status);
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Closed) => {
                self.pending_connectivity = None;
                self.set_status(StatusMessage::error("Connectivity test aborted"));
            }
        }
    }

    // === Periodic refresh ===

    /// Pull finished background work into the visible state
    pub fn tick(&mut self) {
        self.poll_connectivity();
        self.refresh_results();
    }

    fn refresh_results(&mut self) {
        let Some(id) = self.focused.clone() else {
            return;
        };
        let Some(record) = self.engine.peek(&id) else {
            return;
        };

        if record.state != self.focused_state {
            if self.focused_state == ExecutionState::Executing && record.is_settled() {
                let status = match record.state {
                    ExecutionState::Success => StatusMessage::info(format!("{} succeeded", id)),
                    _ => StatusMessage::error(format!(
                        "{} failed (exit {})",
                        id,
                        record.exit_code.unwrap_or(-1)
                    )),
                };
                self.set_status(status);
            }
            self.focused_state = record.state;
        }
        self.layout.update_results(&describe_record(&record));
    }

    // === Command input ===

    /// Parse and apply one free-form command line
    pub fn run_command_line(&mut self, line: &str) {
        debug!("Command input: {}", line);
        let result = commands::parse(line).and_then(|command| self.apply(command));
        if let Err(e) = result {
            self.set_status(StatusMessage::error(e.to_string()));
        }
    }

    fn apply(&mut self, command: ConsoleCommand) -> Result<()> {
        match command {
            ConsoleCommand::SetPrefix { environment, value } => {
                self.require_environment(&environment)?;
                if Environment::from(environment.as_str()).is_local() {
                    return Err(Error::Other("local runs without a prefix".to_string()));
                }
                self.registry.set_prefix(&environment, &value);
                self.set_status(StatusMessage::info(format!(
                    "Prefix for {} set to '{}'",
                    environment, value
                )));
            }
            ConsoleCommand::ResetPrefix { environment } => {
                self.require_environment(&environment)?;
                self.registry.reset_prefix(&environment);
                self.set_status(StatusMessage::info(format!("Prefix for {} reset", environment)));
            }
            ConsoleCommand::Run { command } => {
                let environment = self.navigation.environment().name().to_string();
                self.run_command(&command, &environment);
            }
            ConsoleCommand::Cancel { command } => match command {
                Some(command) => {
                    let id = execution_id(&command, self.navigation.environment().name());
                    self.cancel(&id);
                }
                None => self.cancel_selected(),
            },
            ConsoleCommand::CancelAll { environment } => {
                let environment = environment
                    .unwrap_or_else(|| self.navigation.environment().name().to_string());
                self.cancel_environment(&environment);
            }
            ConsoleCommand::Test(target) => match target {
                TestTarget::Current => {
                    let env = self.navigation.environment().name().to_string();
                    self.start_connectivity(Some(env));
                }
                TestTarget::All => self.start_connectivity(None),
                TestTarget::Environment(env) => {
                    self.require_environment(&env)?;
                    self.start_connectivity(Some(env));
                }
            },
            ConsoleCommand::Mode(mode) => {
                self.navigation.set_mode(mode);
                self.set_status(StatusMessage::info(format!("Mode {}", mode)));
            }
            ConsoleCommand::Env(name) => {
                self.navigation.set_environment(&name)?;
                self.set_status(StatusMessage::info(format!("Environment {}", name)));
            }
            ConsoleCommand::Commands => {
                let listing: Vec<String> = self
                    .registry
                    .commands()
                    .map(|(name, text)| format!("{:<18} {}", name, text))
                    .collect();
                self.show_text(&listing.join("\n"));
            }
            ConsoleCommand::Clear => self.hide_results(),
            ConsoleCommand::Help => self.show_help(),
        }
        Ok(())
    }

    fn require_environment(&self, environment: &str) -> Result<()> {
        if self.registry.has_environment(environment) {
            Ok(())
        } else {
            Err(Error::UnknownEnvironment {
                environment: environment.to_string(),
            })
        }
    }
}

/// Results panel text for one record
pub fn describe_record(record: &ExecutionRecord) -> String {
    let mut header = format!("{} {}  [{}]", record.state.glyph(), record.id(), record.state.as_str());
    if let Some(code) = record.exit_code {
        header.push_str(&format!("  exit {}", code));
    }
    if let Some(at) = record.timestamp {
        header.push_str(&format!("  at {}", at.format("%H:%M:%S")));
    }
    if record.is_running() {
        if let Some(secs) = record.elapsed_seconds() {
            header.push_str(&format!("  {}s", secs));
        }
    }

    let output = record.display_output();
    if output.is_empty() {
        header
    } else {
        format!("{}\n{}", header, output)
    }
}
