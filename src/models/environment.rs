//! Environment Identity
//!
//! An environment is a deployment target such as `local`, `dev` or a
//! user-qualified target like `dev_root`.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Name of the environment that always executes in-process
pub const LOCAL: &str = "local";

/// Symbolic deployment target
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment(String);

impl Environment {
    /// Create an environment from its name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_string())
    }

    /// The local machine
    pub fn local() -> Self {
        Self(LOCAL.to_string())
    }

    /// Environment name
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Whether commands for this environment run without a prefix
    pub fn is_local(&self) -> bool {
        self.0 == LOCAL
    }

    /// Base environment with any user qualifier removed (`dev_root` -> `dev`)
    pub fn base(&self) -> &str {
        self.0.split('_').next().unwrap_or(&self.0)
    }

    /// User qualifier, if any (`dev_root` -> `root`)
    pub fn qualifier(&self) -> Option<&str> {
        self.0.split_once('_').map(|(_, user)| user)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::local()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Environment {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Environment {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl Borrow<str> for Environment {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Default environment order
pub fn default_environments() -> Vec<Environment> {
    ["local", "dev", "staging", "prod", "qa"]
        .into_iter()
        .map(Environment::from)
        .collect()
}
