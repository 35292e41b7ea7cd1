//! Mode Definitions
//!
//! A mode is the kind of operator action shown in the action list.
//! The declaration order is the order modes are cycled through.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Category of operator action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    /// Configuration file selection and inspection
    #[default]
    Toml,
    /// Key management
    Tkm,
    /// Service management
    Tsm,
    /// Remote command
    Rcm,
    /// Deployment
    Deploy,
    /// Organization
    Org,
}

impl Mode {
    /// All modes in cycle order
    pub const ALL: [Mode; 6] = [
        Mode::Toml,
        Mode::Tkm,
        Mode::Tsm,
        Mode::Rcm,
        Mode::Deploy,
        Mode::Org,
    ];

    /// Short label shown in the header tabs
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Toml => "TOML",
            Mode::Tkm => "TKM",
            Mode::Tsm => "TSM",
            Mode::Rcm => "RCM",
            Mode::Deploy => "DEPLOY",
            Mode::Org => "ORG",
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Mode::Toml => "configuration",
            Mode::Tkm => "key management",
            Mode::Tsm => "service management",
            Mode::Rcm => "remote commands",
            Mode::Deploy => "deployment",
            Mode::Org => "organization",
        }
    }

    /// Position in the cycle order
    pub fn index(&self) -> usize {
        Mode::ALL.iter().position(|m| m == self).unwrap_or(0)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownMode {
                mode: s.to_string(),
            })
    }
}
