//! Free-form command input
//!
//! Lines typed after `/` are parsed into console commands.

use crate::error::{Error, Result};
use crate::models::Mode;

/// What `test` should check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestTarget {
    Current,
    All,
    Environment(String),
}

/// A parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// `prefix <env> <value...>`
    SetPrefix { environment: String, value: String },
    /// `reset <env>`
    ResetPrefix { environment: String },
    /// `run <command>` on the current environment
    Run { command: String },
    /// `cancel [command]`; selected action when omitted
    Cancel { command: Option<String> },
    /// `cancel-all [env]`; current environment when omitted
    CancelAll { environment: Option<String> },
    /// `test [env|all]`
    Test(TestTarget),
    /// `mode <MODE>`
    Mode(Mode),
    /// `env <name>`
    Env(String),
    /// `commands`: list the registry
    Commands,
    /// `clear`: hide the results panel
    Clear,
    /// `help`
    Help,
}

/// Parse one command line
pub fn parse(line: &str) -> Result<ConsoleCommand> {
    let line = line.trim();
    let line = line.strip_prefix('/').unwrap_or(line);
    let mut words = line.split_whitespace();
    let verb = words.next().ok_or_else(|| Error::Other("empty command".to_string()))?;
    let rest: Vec<&str> = words.collect();

    let need = |what: &str| Error::Other(format!("usage: {} {}", verb, what));

    match verb {
        "prefix" | "ssh" => {
            let (environment, value) = rest.split_first().ok_or_else(|| need("<env> <prefix>"))?;
            if value.is_empty() {
                return Err(need("<env> <prefix>"));
            }
            Ok(ConsoleCommand::SetPrefix {
                environment: environment.to_string(),
                value: value.join(" "),
            })
        }
        "reset" => {
            let environment = rest.first().ok_or_else(|| need("<env>"))?;
            Ok(ConsoleCommand::ResetPrefix {
                environment: environment.to_string(),
            })
        }
        "run" => {
            let command = rest.first().ok_or_else(|| need("<command>"))?;
            Ok(ConsoleCommand::Run {
                command: command.to_string(),
            })
        }
        "cancel" => Ok(ConsoleCommand::Cancel {
            command: rest.first().map(|s| s.to_string()),
        }),
        "cancel-all" => Ok(ConsoleCommand::CancelAll {
            environment: rest.first().map(|s| s.to_string()),
        }),
        "test" => Ok(ConsoleCommand::Test(match rest.first() {
            None => TestTarget::Current,
            Some(&"all") => TestTarget::All,
            Some(env) => TestTarget::Environment(env.to_string()),
        })),
        "mode" => {
            let mode = rest.first().ok_or_else(|| need("<MODE>"))?;
            Ok(ConsoleCommand::Mode(mode.parse()?))
        }
        "env" => {
            let env = rest.first().ok_or_else(|| need("<name>"))?;
            Ok(ConsoleCommand::Env(env.to_string()))
        }
        "commands" => Ok(ConsoleCommand::Commands),
        "clear" => Ok(ConsoleCommand::Clear),
        "help" | "?" => Ok(ConsoleCommand::Help),
        other => Err(Error::Other(format!("unknown command '{}'", other))),
    }
}
