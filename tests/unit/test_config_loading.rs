//! Unit Tests for Configuration Loading

use std::fs;

use tempfile::TempDir;
use tview::config::{ConfigError, ConfigLoader, ConsoleConfig};
use tview::error::Error;
use tview::models::{Environment, Mode};

const SAMPLE: &str = r#"
[console]
connectivity_timeout_secs = 2
tick_ms = 100
env_dir = "/srv/tview/env"

[environments]
order = ["local", "dev", "dev_root", "prod"]

[environments.prefixes]
dev = "ssh deploy@dev.example.com"
dev_root = "ssh root@dev.example.com"

[commands]
disk_usage = "df -hT"
load = "cat /proc/loadavg"

[[actions]]
mode = "RCM"
scope = "remote"
id = "load"
name = "Load"
description = "Load averages"
"#;

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_full_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, SAMPLE);

    let config = ConfigLoader::load_file(&path).unwrap();
    assert_eq!(config.console.connectivity_timeout_secs, 2);
    assert_eq!(config.tick_interval().as_millis(), 100);
    assert_eq!(config.environments().len(), 4);

    let registry = config.build_registry();
    assert_eq!(registry.resolve("disk_usage").unwrap(), "df -hT");
    assert_eq!(
        registry.build_invocation("load", "dev_root").unwrap(),
        "ssh root@dev.example.com 'cat /proc/loadavg'"
    );
    assert!(registry
        .actions_for(Mode::Rcm, &Environment::from("prod"))
        .iter()
        .any(|a| a.id == "load"));
    assert!(!registry
        .actions_for(Mode::Rcm, &Environment::local())
        .iter()
        .any(|a| a.id == "load"));
    assert!(registry.resolve_prefix("prod").is_err());
}

#[test]
fn test_empty_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");

    let config = ConfigLoader::load_file(&path).unwrap();
    assert_eq!(config.console.tick_ms, ConsoleConfig::default().console.tick_ms);
    assert_eq!(config.environments().first(), Some(&Environment::local()));
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[console\ntick_ms = ");

    assert!(matches!(
        ConfigLoader::load_file(&path),
        Err(Error::ConfigParseFailed { .. })
    ));
}

#[test]
fn test_validation_error_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[environments]\norder = [\"dev\"]\n");

    assert!(matches!(
        ConfigLoader::load_file(&path),
        Err(Error::Config(ConfigError::MissingLocal))
    ));
}

#[test]
fn test_unknown_mode_in_actions_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "[[actions]]\nmode = \"NOPE\"\nid = \"x\"\nname = \"x\"\ndescription = \"x\"\n",
    );
    assert!(ConfigLoader::load_file(&path).is_err());
}

#[test]
fn test_missing_explicit_file_is_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(matches!(
        ConfigLoader::load(Some(&missing)),
        Err(Error::ConfigLoadFailed { .. })
    ));
}

#[test]
fn test_search_skips_broken_files() {
    let dir = TempDir::new().unwrap();
    let broken = dir.path().join("broken.toml");
    fs::write(&broken, "not = [valid").unwrap();
    let good = write_config(&dir, "[console]\ntick_ms = 50\n");

    let mut loader = ConfigLoader::with_search_paths(vec![
        dir.path().join("missing.toml"),
        broken,
        good.clone(),
    ]);
    let config = loader.find_and_load().unwrap();
    assert_eq!(config.console.tick_ms, 50);
    assert_eq!(loader.current_path(), Some(good.as_path()));
}

#[test]
fn test_search_with_nothing_found_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let mut loader = ConfigLoader::with_search_paths(vec![dir.path().join("none.toml")]);
    let config = loader.find_and_load().unwrap();
    assert!(loader.current_path().is_none());
    assert_eq!(config.environments().len(), 5);
}
