//! tview - Environment operations console
//!
//! A keyboard-driven terminal console for running operator commands
//! against a set of deployment environments. Commands run locally or on a
//! remote host through a per-environment connection prefix (usually an
//! `ssh` invocation), in the background, while the UI stays responsive.
//!
//! ## Module Organization
//!
//! ### Core
//!
//! - [`registry`] - Command table, connection prefixes, action catalog
//! - [`navigation`] - Mode / environment / item selection state machine
//! - [`execution`] - Background launches, cancellation, connectivity checks
//! - [`layout`] - Screen regions and results scrolling
//! - [`models`] - Data structures (Mode, Environment, ExecutionRecord)
//! - [`mod@error`] - Error types and Result aliases
//!
//! ### Console
//!
//! - [`console`] - Session state, key handling, free-form commands
//! - [`ui`] - Frame rendering and the crossterm backend
//! - [`config`] - Console config file and per-environment config files
//!
//! ## Quick Start
//!
//! ```no_run
//! use tview::{CommandRegistry, ExecutionEngine};
//!
//! # fn main() -> tview::Result<()> {
//! let runtime = tokio::runtime::Runtime::new()?;
//! let mut registry = CommandRegistry::with_defaults();
//! registry.set_prefix("dev", "ssh root@dev.example.com");
//!
//! let engine = ExecutionEngine::new(runtime.handle().clone());
//! let id = engine.start(&registry, "uptime", "dev")?;
//! println!("{:?}", engine.state(&id));
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **Foreground loop:** render, poll one key with a short timeout, mutate
//! - **Tokio runtime:** one detached task per launched command
//!
//! Records are shared through a mutex-guarded table keyed by
//! `"<command>:<environment>"`. The loop reads them on every redraw.

pub mod config;
pub mod console;
pub mod error;
pub mod execution;
pub mod layout;
pub mod models;
pub mod navigation;
pub mod registry;
pub mod ui;

pub use config::{ConfigLoader, ConsoleConfig, EnvConfigLocator};
pub use console::{Console, ConsoleAction, Key};
pub use error::{Error, Result};
pub use execution::{ConnectivityReport, EngineConfig, ExecutionEngine};
pub use layout::{LayoutEngine, Region, Regions, ScrollDirection};
pub use models::{Action, Environment, ExecutionRecord, ExecutionState, Mode};
pub use navigation::{NavigationState, View};
pub use registry::CommandRegistry;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
