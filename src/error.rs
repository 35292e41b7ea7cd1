//! Error types and Result aliases for tview

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::ConfigError;

/// Result type alias for tview operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tview
#[derive(Debug)]
pub enum Error {
    // === Resolution errors (reported synchronously, nothing is launched) ===
    /// Command name is not in the registry
    NotFound {
        command: String,
    },

    /// Non-local environment has no connection prefix
    NotConfigured {
        environment: String,
    },

    // === Execution lifecycle errors ===
    /// A start was requested for an id that is already executing
    AlreadyRunning {
        execution_id: String,
    },

    /// A cancel was requested for an id with no live process
    NotRunning {
        execution_id: String,
    },

    /// Command exited non-zero (only produced when inspecting a record)
    RuntimeFailure {
        execution_id: String,
        exit_code: i32,
    },

    /// Failed to spawn the shell for a command
    CommandSpawnFailed {
        command: String,
        reason: String,
    },

    /// Failed to send signal to process
    SignalSendFailed {
        signal: String,
        reason: String,
    },

    // === Connectivity errors ===
    /// Round-trip check did not finish in time
    ConnectivityTimeout {
        environment: String,
        timeout: Duration,
    },

    /// Round-trip check failed
    ConnectivityFailure {
        environment: String,
        reason: String,
    },

    // === Navigation errors ===
    /// Unknown mode name
    UnknownMode {
        mode: String,
    },

    /// Unknown environment name
    UnknownEnvironment {
        environment: String,
    },

    // === Configuration errors ===
    /// Failed to load configuration file
    ConfigLoadFailed {
        path: PathBuf,
        reason: String,
    },

    /// Failed to parse configuration
    ConfigParseFailed {
        path: PathBuf,
        reason: String,
    },

    /// Configuration validation failed
    Config(ConfigError),

    // === I/O and serialization errors ===
    /// I/O errors
    Io(std::io::Error),

    /// TOML parsing errors
    Toml(toml::de::Error),

    // === Generic fallback (use sparingly) ===
    /// Generic errors
    Other(String),
}

impl Error {
    /// Whether this error was raised while resolving a command or prefix
    pub fn is_resolution_error(&self) -> bool {
        matches!(self, Error::NotFound { .. } | Error::NotConfigured { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound { command } => {
                write!(f, "Command '{}' is not registered", command)
            }
            Error::NotConfigured { environment } => {
                write!(f, "Environment '{}' has no connection prefix", environment)
            }
            Error::AlreadyRunning { execution_id } => {
                write!(f, "'{}' is already running", execution_id)
            }
            Error::NotRunning { execution_id } => {
                write!(f, "'{}' is not running", execution_id)
            }
            Error::RuntimeFailure {
                execution_id,
                exit_code,
            } => {
                write!(f, "'{}' exited with code {}", execution_id, exit_code)
            }
            Error::CommandSpawnFailed { command, reason } => {
                write!(f, "Failed to spawn command '{}': {}", command, reason)
            }
            Error::SignalSendFailed { signal, reason } => {
                write!(f, "Failed to send signal '{}': {}", signal, reason)
            }
            Error::ConnectivityTimeout {
                environment,
                timeout,
            } => {
                write!(
                    f,
                    "Connectivity check for '{}' timed out after {:?}",
                    environment, timeout
                )
            }
            Error::ConnectivityFailure {
                environment,
                reason,
            } => {
                write!(f, "Connectivity check for '{}' failed: {}", environment, reason)
            }
            Error::UnknownMode { mode } => write!(f, "Unknown mode: '{}'", mode),
            Error::UnknownEnvironment { environment } => {
                write!(f, "Unknown environment: '{}'", environment)
            }
            Error::ConfigLoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path.display(), reason)
            }
            Error::ConfigParseFailed { path, reason } => {
                write!(f, "Failed to parse config '{}': {}", path.display(), reason)
            }
            Error::Config(err) => write!(f, "Invalid configuration: {}", err),
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Toml(err) => write!(f, "TOML parsing error: {}", err),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Toml(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Toml(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Error::Other(err)
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::Other(err.to_string())
    }
}
