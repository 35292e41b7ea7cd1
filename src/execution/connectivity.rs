//! Connectivity checks
//!
//! A round-trip command is sent through an environment's connection
//! prefix with a bounded wait. This is the only engine operation with a
//! timeout.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

use super::signals;
use crate::error::{Error, Result};
use crate::models::Environment;

/// Outcome of checking every registered environment
#[derive(Debug, Default)]
pub struct ConnectivityReport {
    /// Per-environment outcome, in registry order
    pub results: Vec<(Environment, Result<()>)>,
}

impl ConnectivityReport {
    /// Number of environments that failed
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.is_err()).count()
    }

    pub fn is_all_ok(&self) -> bool {
        self.failures() == 0
    }

    /// One line per environment, for the results panel
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .results
            .iter()
            .map(|(env, result)| match result {
                Ok(()) => format!("{:<12} ok", env.name()),
                Err(e) => format!("{:<12} FAIL  {}", env.name(), e),
            })
            .collect();
        lines.push(format!(
            "{} of {} environments failed",
            self.failures(),
            self.results.len()
        ));
        lines
    }
}

/// Run `invocation` under `shell` and wait at most `limit`
pub(crate) async fn probe(
    shell: &Path,
    environment: &str,
    invocation: &str,
    limit: Duration,
) -> Result<()> {
    let child = Command::new(shell)
        .arg("-c")
        .arg(invocation)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .process_group(0)
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| Error::ConnectivityFailure {
            environment: environment.to_string(),
            reason: e.to_string(),
        })?;
    let pid = child.id().unwrap_or(0);

    match timeout(limit, child.wait_with_output()).await {
        Err(_) => {
            warn!("Connectivity check for {} timed out", environment);
            if let Err(e) = signals::kill_group(pid) {
                warn!("Failed to stop timed-out check for {}: {}", environment, e);
            }
            Err(Error::ConnectivityTimeout {
                environment: environment.to_string(),
                timeout: limit,
            })
        }
        Ok(Err(e)) => Err(Error::ConnectivityFailure {
            environment: environment.to_string(),
            reason: e.to_string(),
        }),
        Ok(Ok(output)) if output.status.success() => {
            info!("Connectivity check for {} passed", environment);
            Ok(())
        }
        Ok(Ok(output)) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr
                .lines()
                .find(|l| !l.trim().is_empty())
                .map(|l| l.trim().to_string())
                .unwrap_or_else(|| match output.status.code() {
                    Some(code) => format!("exit code {}", code),
                    None => "terminated by signal".to_string(),
                });
            Err(Error::ConnectivityFailure {
                environment: environment.to_string(),
                reason,
            })
        }
    }
}
