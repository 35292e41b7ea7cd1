//! Configuration management for tview
//!
//! The console config declares the environment order, default connection
//! prefixes, extra commands and extra actions. Everything is optional: a
//! missing section falls back to the compiled-in defaults, and file
//! entries merge over them.

pub mod env_files;
pub mod loader;

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::execution::EngineConfig;
use crate::models::environment::LOCAL;
use crate::models::Environment;
use crate::registry::{ActionEntry, ActionScope, CommandRegistry};

pub use env_files::EnvConfigLocator;
pub use loader::ConfigLoader;

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment order cannot be empty")]
    NoEnvironments,

    #[error("Environment order must include 'local'")]
    MissingLocal,

    #[error("Environment '{0}' is listed more than once")]
    DuplicateEnvironment(String),

    #[error("Invalid environment name: '{0}'")]
    InvalidEnvironmentName(String),

    #[error("Prefix configured for unknown environment '{0}'")]
    PrefixForUnknownEnvironment(String),

    #[error("Invalid connectivity timeout: {0}s (must be greater than 0)")]
    InvalidConnectivityTimeout(u64),

    #[error("Invalid tick interval: {0}ms (must be greater than 0)")]
    InvalidTickInterval(u64),

    #[error("Command '{0}' has an empty command line")]
    EmptyCommand(String),

    #[error("Action '{0}' has scope 'list' but no environments")]
    EmptyActionScope(String),
}

/// Main configuration structure for tview
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Console behaviour
    pub console: ConsoleSection,

    /// Environment order and prefixes
    pub environments: EnvironmentsSection,

    /// Extra or replacement commands (name -> command line)
    pub commands: BTreeMap<String, String>,

    /// Extra actions appended to the default catalog
    pub actions: Vec<ActionEntry>,
}

/// Console behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleSection {
    /// Bounded wait for connectivity checks, in seconds
    pub connectivity_timeout_secs: u64,

    /// Redraw interval while idle, in milliseconds
    pub tick_ms: u64,

    /// Directory holding per-environment config files
    pub env_dir: Option<PathBuf>,

    /// Shell used to interpret command lines
    pub shell: PathBuf,
}

impl Default for ConsoleSection {
    fn default() -> Self {
        Self {
            connectivity_timeout_secs: 5,
            tick_ms: 200,
            env_dir: None,
            shell: PathBuf::from("sh"),
        }
    }
}

/// Environment order and default connection prefixes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentsSection {
    /// Navigation order
    pub order: Vec<String>,

    /// Environment -> default prefix (e.g. `ssh root@dev.example.com`)
    pub prefixes: BTreeMap<String, String>,
}

impl Default for EnvironmentsSection {
    fn default() -> Self {
        Self {
            order: crate::models::environment::default_environments()
                .into_iter()
                .map(|e| e.name().to_string())
                .collect(),
            prefixes: BTreeMap::new(),
        }
    }
}

impl ConsoleConfig {
    /// Check the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environments.order.is_empty() {
            return Err(ConfigError::NoEnvironments);
        }

        let mut seen = HashSet::new();
        for name in &self.environments.order {
            let trimmed = name.trim();
            if trimmed.is_empty() || trimmed.contains(char::is_whitespace) || trimmed.contains(':')
            {
                return Err(ConfigError::InvalidEnvironmentName(name.clone()));
            }
            if !seen.insert(trimmed) {
                return Err(ConfigError::DuplicateEnvironment(name.clone()));
            }
        }
        if !seen.contains(LOCAL) {
            return Err(ConfigError::MissingLocal);
        }

        for env in self.environments.prefixes.keys() {
            if !seen.contains(env.as_str()) {
                return Err(ConfigError::PrefixForUnknownEnvironment(env.clone()));
            }
        }

        if self.console.connectivity_timeout_secs == 0 {
            return Err(ConfigError::InvalidConnectivityTimeout(0));
        }
        if self.console.tick_ms == 0 {
            return Err(ConfigError::InvalidTickInterval(0));
        }

        for (name, text) in &self.commands {
            if text.trim().is_empty() {
                return Err(ConfigError::EmptyCommand(name.clone()));
            }
        }

        for entry in &self.actions {
            if entry.scope == ActionScope::List && entry.envs.is_empty() {
                return Err(ConfigError::EmptyActionScope(entry.action.id.clone()));
            }
        }

        Ok(())
    }

    /// Environment order as typed values
    pub fn environments(&self) -> Vec<Environment> {
        self.environments
            .order
            .iter()
            .map(|name| Environment::from(name.as_str()))
            .collect()
    }

    /// Build the registry: compiled-in defaults with this config merged over
    pub fn build_registry(&self) -> CommandRegistry {
        let mut registry = CommandRegistry::with_defaults();
        registry.set_environments(self.environments());
        for (name, text) in &self.commands {
            registry.register_command(name, text);
        }
        for (env, prefix) in &self.environments.prefixes {
            registry.register_default_prefix(env, prefix);
        }
        for entry in &self.actions {
            registry.add_action(entry.clone());
        }
        registry
    }

    /// Execution engine settings
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            shell: self.console.shell.clone(),
            connectivity_timeout: Duration::from_secs(self.console.connectivity_timeout_secs),
            ..EngineConfig::default()
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.console.tick_ms)
    }

    /// Base directory for per-environment files, `~` expanded
    pub fn env_dir(&self) -> Option<PathBuf> {
        self.console.env_dir.as_deref().map(expand_tilde)
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}
