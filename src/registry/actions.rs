//! Action Catalog
//!
//! Maps (mode, environment) pairs to ordered action lists. Entries are
//! scoped to every environment, only local, only remote, or an explicit
//! list of environment names.

use serde::{Deserialize, Serialize};

use crate::models::{Action, Environment, Mode};

/// Built-in action: resolve and select the environment's config file
pub const CONFIG_PATH_ACTION_ID: &str = "config_path";
/// Built-in action: round-trip connectivity check for the environment
pub const TEST_CONNECTIVITY_ACTION_ID: &str = "test_connectivity";

/// Which environments an action entry applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActionScope {
    #[default]
    All,
    Local,
    Remote,
    /// Only the environments listed in `envs`
    List,
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEntry {
    pub mode: Mode,
    #[serde(default)]
    pub scope: ActionScope,
    #[serde(default)]
    pub envs: Vec<String>,
    #[serde(flatten)]
    pub action: Action,
}

impl ActionEntry {
    pub fn new(mode: Mode, scope: ActionScope, action: Action) -> Self {
        Self {
            mode,
            scope,
            envs: Vec::new(),
            action,
        }
    }

    /// Entry restricted to the named environments
    pub fn for_envs(mode: Mode, envs: &[&str], action: Action) -> Self {
        Self {
            mode,
            scope: ActionScope::List,
            envs: envs.iter().map(|e| e.to_string()).collect(),
            action,
        }
    }

    /// Whether this entry applies to the given environment.
    /// Listed names also match user-qualified variants (`dev` matches `dev_root`).
    pub fn applies_to(&self, environment: &Environment) -> bool {
        match self.scope {
            ActionScope::All => true,
            ActionScope::Local => environment.is_local(),
            ActionScope::Remote => !environment.is_local(),
            ActionScope::List => self
                .envs
                .iter()
                .any(|e| e == environment.name() || e == environment.base()),
        }
    }
}

/// Ordered collection of action entries
#[derive(Debug, Clone, Default)]
pub struct ActionCatalog {
    entries: Vec<ActionEntry>,
}

impl ActionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the built-in action set
    pub fn with_defaults() -> Self {
        Self {
            entries: default_entries(),
        }
    }

    /// Append an entry, replacing an earlier entry with the same mode and id
    pub fn add(&mut self, entry: ActionEntry) {
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|e| e.mode == entry.mode && e.action.id == entry.action.id)
        {
            *existing = entry;
        } else {
            self.entries.push(entry);
        }
    }

    /// Actions for a pair, in registration order (may be empty)
    pub fn actions_for(&self, mode: Mode, environment: &Environment) -> Vec<Action> {
        self.entries
            .iter()
            .filter(|e| e.mode == mode && e.applies_to(environment))
            .map(|e| e.action.clone())
            .collect()
    }

    pub fn entries(&self) -> &[ActionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn default_entries() -> Vec<ActionEntry> {
    use ActionScope::{All, Local, Remote};

    vec![
        // TOML
        ActionEntry::new(
            Mode::Toml,
            All,
            Action::new(
                CONFIG_PATH_ACTION_ID,
                "Select config",
                "Make this environment's config file the active one",
            ),
        ),
        // TKM
        ActionEntry::new(
            Mode::Tkm,
            All,
            Action::new("list_keys", "List keys", "Files in ~/.ssh"),
        ),
        ActionEntry::new(
            Mode::Tkm,
            All,
            Action::new(
                "authorized_keys",
                "Authorized keys",
                "Keys allowed to log in",
            ),
        ),
        ActionEntry::new(
            Mode::Tkm,
            Remote,
            Action::new(
                TEST_CONNECTIVITY_ACTION_ID,
                "Test connection",
                "Round-trip check through the connection prefix",
            ),
        ),
        // TSM
        ActionEntry::new(
            Mode::Tsm,
            All,
            Action::new("list_services", "Running services", "Active service units"),
        ),
        ActionEntry::new(
            Mode::Tsm,
            All,
            Action::new("failed_services", "Failed services", "Units in failed state"),
        ),
        ActionEntry::new(
            Mode::Tsm,
            Remote,
            Action::new("nginx_status", "Nginx status", "systemd status of nginx"),
        ),
        // RCM
        ActionEntry::new(
            Mode::Rcm,
            All,
            Action::new("disk_usage", "Disk usage", "Filesystem usage"),
        ),
        ActionEntry::new(
            Mode::Rcm,
            All,
            Action::new("memory", "Memory", "Memory and swap usage"),
        ),
        ActionEntry::new(
            Mode::Rcm,
            All,
            Action::new("uptime", "Uptime", "Uptime and load averages"),
        ),
        ActionEntry::new(
            Mode::Rcm,
            All,
            Action::new("top_processes", "Top processes", "Processes by CPU"),
        ),
        ActionEntry::new(
            Mode::Rcm,
            All,
            Action::new("whoami", "Who am I", "Effective user"),
        ),
        ActionEntry::new(
            Mode::Rcm,
            Remote,
            Action::new("tail_syslog", "Syslog tail", "Last 50 lines of syslog"),
        ),
        // DEPLOY
        ActionEntry::new(
            Mode::Deploy,
            Remote,
            Action::new("git_status", "Git status", "Working tree of the deployed checkout"),
        ),
        ActionEntry::new(
            Mode::Deploy,
            Remote,
            Action::new("git_log", "Recent commits", "Last 10 commits deployed"),
        ),
        ActionEntry::new(
            Mode::Deploy,
            Remote,
            Action::new("deploy_pull", "Pull", "Fast-forward the deployed checkout"),
        ),
        // ORG
        ActionEntry::new(
            Mode::Org,
            Local,
            Action::new("org_list", "Organizations", "Known organizations"),
        ),
    ]
}
