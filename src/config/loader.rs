//! Configuration File Loading
//!
//! Finds the console config in the usual locations and falls back to
//! built-in defaults when none exists.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::ConsoleConfig;
use crate::error::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "TVIEW_CONFIG";

/// Configuration file loader
pub struct ConfigLoader {
    /// Candidate config files, in priority order
    search_paths: Vec<PathBuf>,
    /// Path of the file that was loaded, if any
    current_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Loader over the default search paths
    pub fn new() -> Self {
        Self {
            search_paths: Self::get_search_paths(),
            current_path: None,
        }
    }

    /// Loader over explicit candidates
    pub fn with_search_paths(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            current_path: None,
        }
    }

    /// Load `path` if given, else search; defaults when nothing is found.
    /// An explicit path that does not exist is an error.
    pub fn load(explicit: Option<&Path>) -> Result<(ConsoleConfig, Option<PathBuf>)> {
        if let Some(path) = explicit {
            let config = Self::load_file(path)?;
            return Ok((config, Some(path.to_path_buf())));
        }
        let mut loader = Self::new();
        let config = loader.find_and_load()?;
        Ok((config, loader.current_path))
    }

    /// Search candidates in order; first readable file wins
    pub fn find_and_load(&mut self) -> Result<ConsoleConfig> {
        for path in &self.search_paths {
            if !path.is_file() {
                continue;
            }
            match Self::load_file(path) {
                Ok(config) => {
                    info!("Loaded configuration from {}", path.display());
                    self.current_path = Some(path.clone());
                    return Ok(config);
                }
                Err(e) => {
                    warn!("Skipping config {}: {}", path.display(), e);
                }
            }
        }

        info!("No configuration file found, using defaults");
        let config = ConsoleConfig::default();
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate one TOML file
    pub fn load_file(path: &Path) -> Result<ConsoleConfig> {
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: ConsoleConfig =
            toml::from_str(&content).map_err(|e| Error::ConfigParseFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Path of the loaded file, if any
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Default search order
    fn get_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(explicit) = env::var(CONFIG_ENV_VAR) {
            if !explicit.trim().is_empty() {
                paths.push(super::expand_tilde(Path::new(explicit.trim())));
            }
        }

        if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg_config).join("tview").join("config.toml"));
        }

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("tview").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".tview").join("config.toml"));
        }

        paths.dedup();
        paths
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
