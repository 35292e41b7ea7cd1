//! Integration Tests for Connectivity Checks
//!
//! Prefixes are plain local programs here so the round trip can be
//! exercised without a remote host.

use std::time::Duration;

use tokio::runtime::Handle;
use tview::error::Error;
use tview::models::Environment;
use tview::{CommandRegistry, EngineConfig, ExecutionEngine};

fn engine(timeout: Duration) -> ExecutionEngine {
    ExecutionEngine::with_config(
        Handle::current(),
        EngineConfig {
            connectivity_timeout: timeout,
            ..EngineConfig::default()
        },
    )
}

#[tokio::test]
async fn test_local_always_passes() {
    let engine = engine(Duration::from_secs(5));
    let registry = CommandRegistry::with_defaults();
    assert!(engine.test_connectivity(&registry, "local").await.is_ok());
}

#[tokio::test]
async fn test_missing_prefix_is_not_configured() {
    let engine = engine(Duration::from_secs(5));
    let registry = CommandRegistry::with_defaults();

    let err = engine.test_connectivity(&registry, "dev").await.unwrap_err();
    assert!(matches!(err, Error::NotConfigured { ref environment } if environment == "dev"));
}

#[tokio::test]
async fn test_working_prefix_passes() {
    let engine = engine(Duration::from_secs(5));
    let mut registry = CommandRegistry::with_defaults();
    registry.set_prefix("dev", "sh -c");

    assert!(engine.test_connectivity(&registry, "dev").await.is_ok());
}

#[tokio::test]
async fn test_failing_prefix_reports_failure() {
    let engine = engine(Duration::from_secs(5));
    let mut registry = CommandRegistry::with_defaults();
    registry.set_prefix("staging", "false");

    let err = engine
        .test_connectivity(&registry, "staging")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ConnectivityFailure { ref environment, .. } if environment == "staging"));
}

#[tokio::test]
async fn test_slow_prefix_times_out() {
    let engine = engine(Duration::from_millis(200));
    let mut registry = CommandRegistry::with_defaults();
    registry.set_prefix("prod", "sleep 5;");

    let started = std::time::Instant::now();
    let err = engine.test_connectivity(&registry, "prod").await.unwrap_err();
    assert!(matches!(err, Error::ConnectivityTimeout { .. }));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_all_reports_in_registry_order() {
    let engine = engine(Duration::from_secs(5));
    let mut registry = CommandRegistry::with_defaults();
    registry.set_environments(vec![
        Environment::local(),
        Environment::from("dev"),
        Environment::from("staging"),
        Environment::from("qa"),
    ]);
    registry.set_prefix("dev", "sh -c");
    registry.set_prefix("staging", "false");

    let report = engine.test_all_connectivity(&registry).await;
    let names: Vec<&str> = report.results.iter().map(|(e, _)| e.name()).collect();
    assert_eq!(names, vec!["local", "dev", "staging", "qa"]);

    assert!(report.results[0].1.is_ok());
    assert!(report.results[1].1.is_ok());
    assert!(report.results[2].1.is_err());
    assert!(matches!(report.results[3].1, Err(Error::NotConfigured { .. })));
    assert_eq!(report.failures(), 2);
    assert!(!report.is_all_ok());

    let summary = report.summary_lines();
    assert_eq!(summary.len(), 5);
    assert!(summary[4].starts_with("2 of 4"));
}
