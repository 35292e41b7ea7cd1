//! Action Model
//!
//! One selectable row of the action list.

use serde::{Deserialize, Serialize};

/// Identifier of the synthetic action shown when nothing is registered
pub const HELP_ACTION_ID: &str = "help";

/// A selectable operation scoped to a (mode, environment) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Identifier; a registry command name or a built-in action id
    pub id: String,
    /// Display name
    pub name: String,
    /// One-line description
    pub description: String,
}

impl Action {
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    /// Fallback action used for an empty action list
    pub fn help() -> Self {
        Self::new(HELP_ACTION_ID, "Help", "Show key bindings and console usage")
    }

    pub fn is_help(&self) -> bool {
        self.id == HELP_ACTION_ID
    }
}
