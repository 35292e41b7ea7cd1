//! Per-environment configuration files
//!
//! The console does not parse these files. It only resolves which file
//! belongs to an environment and remembers which one is active, so the
//! external editor knows what to open.

use std::env;
use std::path::{Path, PathBuf};

use tracing::info;

/// Base directory override
pub const ENV_DIR_VAR: &str = "TVIEW_ENV_DIR";
/// Initially active config file
pub const ACTIVE_CONFIG_VAR: &str = "TVIEW_ACTIVE_CONFIG";

/// Resolves `<base>/<environment>.toml` and tracks the active file
#[derive(Debug, Clone)]
pub struct EnvConfigLocator {
    base_dir: PathBuf,
    active: Option<PathBuf>,
}

impl EnvConfigLocator {
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            active: None,
        }
    }

    /// Locator from the process environment, falling back to `configured`
    /// and then `<config dir>/tview/env`
    pub fn from_env(configured: Option<PathBuf>) -> Self {
        let base_dir = env::var(ENV_DIR_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| super::expand_tilde(Path::new(v.trim())))
            .or(configured)
            .unwrap_or_else(default_env_dir);
        let active = env::var(ACTIVE_CONFIG_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        Self { base_dir, active }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// File that belongs to `environment`
    pub fn path_for(&self, environment: &str) -> PathBuf {
        self.base_dir.join(format!("{}.toml", environment))
    }

    /// Resolve and activate the file for `environment`
    pub fn set_active_config_for(&mut self, environment: &str) -> PathBuf {
        let path = self.path_for(environment);
        info!("Active config for {} is {}", environment, path.display());
        self.active = Some(path.clone());
        path
    }

    pub fn active(&self) -> Option<&Path> {
        self.active.as_deref()
    }
}

fn default_env_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tview")
        .join("env")
}
