//! Command Registry
//!
//! Static mapping from symbolic command names to literal shell commands,
//! from environments to connection prefixes, and from (mode, environment)
//! pairs to action lists.
//!
//! Prefixes have a default value and a current value. Operator overrides
//! only touch the current value and last for the life of the process.

pub mod actions;

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{Action, Environment, Mode};

pub use actions::{ActionCatalog, ActionEntry, ActionScope};

/// Compiled-in command table
pub const DEFAULT_COMMANDS: &[(&str, &str)] = &[
    ("disk_usage", "df -h"),
    ("memory", "free -h"),
    ("uptime", "uptime"),
    ("whoami", "whoami"),
    ("top_processes", "ps aux --sort=-%cpu | head -n 15"),
    ("tail_syslog", "tail -n 50 /var/log/syslog"),
    ("list_keys", "ls -la ~/.ssh"),
    ("authorized_keys", "cat ~/.ssh/authorized_keys"),
    (
        "list_services",
        "systemctl list-units --type=service --state=running --no-pager",
    ),
    ("failed_services", "systemctl --failed --no-pager"),
    ("nginx_status", "systemctl status nginx --no-pager"),
    ("git_status", "cd ~/src && git status --short --branch"),
    ("git_log", "cd ~/src && git log --oneline -10"),
    ("deploy_pull", "cd ~/src && git pull --ff-only"),
    ("org_list", "ls -1 ~/tetra/orgs"),
];

/// Quote `text` as a single POSIX shell word
pub fn shell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}

/// Registry of commands, connection prefixes and actions
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    /// Command name -> literal command text
    commands: BTreeMap<String, String>,
    /// Environment -> prefix restored by `reset_prefix`
    default_prefixes: HashMap<String, String>,
    /// Environment -> prefix in effect
    prefixes: HashMap<String, String>,
    /// Environments in navigation order
    environments: Vec<Environment>,
    /// Action lists
    catalog: ActionCatalog,
}

impl CommandRegistry {
    /// Empty registry with only the local environment
    pub fn new() -> Self {
        Self {
            commands: BTreeMap::new(),
            default_prefixes: HashMap::new(),
            prefixes: HashMap::new(),
            environments: vec![Environment::local()],
            catalog: ActionCatalog::new(),
        }
    }

    /// Registry with compiled-in commands, actions and environments.
    /// No remote environment has a prefix until one is configured.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (name, text) in DEFAULT_COMMANDS {
            registry.register_command(name, text);
        }
        registry.environments = crate::models::environment::default_environments();
        registry.catalog = ActionCatalog::with_defaults();
        registry
    }

    /// Add or replace a command
    pub fn register_command(&mut self, name: &str, text: &str) {
        self.commands.insert(name.to_string(), text.to_string());
    }

    /// Register a default prefix; also becomes the current prefix
    pub fn register_default_prefix(&mut self, environment: &str, prefix: &str) {
        self.default_prefixes
            .insert(environment.to_string(), prefix.to_string());
        self.prefixes
            .insert(environment.to_string(), prefix.to_string());
    }

    /// Replace the environment order
    pub fn set_environments(&mut self, environments: Vec<Environment>) {
        self.environments = environments;
    }

    /// Add an action catalog entry
    pub fn add_action(&mut self, entry: ActionEntry) {
        self.catalog.add(entry);
    }

    /// Look up the command text for a name
    pub fn resolve(&self, command_name: &str) -> Result<&str> {
        self.commands
            .get(command_name)
            .map(String::as_str)
            .ok_or_else(|| Error::NotFound {
                command: command_name.to_string(),
            })
    }

    /// Connection prefix for an environment; empty for local
    pub fn resolve_prefix(&self, environment: &str) -> Result<&str> {
        if Environment::from(environment).is_local() {
            return Ok("");
        }
        match self.prefixes.get(environment) {
            Some(prefix) if !prefix.trim().is_empty() => Ok(prefix.as_str()),
            _ => Err(Error::NotConfigured {
                environment: environment.to_string(),
            }),
        }
    }

    /// Override the prefix for an environment
    pub fn set_prefix(&mut self, environment: &str, value: &str) {
        if Environment::from(environment).is_local() {
            warn!("Ignoring prefix override for local environment");
            return;
        }
        debug!("Prefix for {} set to '{}'", environment, value);
        self.prefixes
            .insert(environment.to_string(), value.trim().to_string());
    }

    /// Restore the default prefix (or drop the override if there is none)
    pub fn reset_prefix(&mut self, environment: &str) {
        match self.default_prefixes.get(environment) {
            Some(default) => {
                self.prefixes
                    .insert(environment.to_string(), default.clone());
            }
            None => {
                self.prefixes.remove(environment);
            }
        }
        debug!("Prefix for {} reset", environment);
    }

    /// Whether the current prefix differs from the default
    pub fn is_prefix_overridden(&self, environment: &str) -> bool {
        self.prefixes.get(environment) != self.default_prefixes.get(environment)
    }

    /// Full shell invocation for a command on an environment
    pub fn build_invocation(&self, command_name: &str, environment: &str) -> Result<String> {
        let command = self.resolve(command_name)?;
        let prefix = self.resolve_prefix(environment)?;
        if prefix.is_empty() {
            Ok(command.to_string())
        } else {
            Ok(format!("{} {}", prefix, shell_quote(command)))
        }
    }

    /// Derived action list (may be empty; navigation substitutes help)
    pub fn actions_for(&self, mode: Mode, environment: &Environment) -> Vec<Action> {
        self.catalog.actions_for(mode, environment)
    }

    pub fn contains_command(&self, command_name: &str) -> bool {
        self.commands.contains_key(command_name)
    }

    /// Commands sorted by name
    pub fn commands(&self) -> impl Iterator<Item = (&str, &str)> {
        self.commands.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn environments(&self) -> &[Environment] {
        &self.environments
    }

    pub fn has_environment(&self, environment: &str) -> bool {
        self.environments.iter().any(|e| e.name() == environment)
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
