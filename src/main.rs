//! tview - Environment operations console
//!
//! Loads the console configuration, starts the background runtime and
//! hands the terminal to the console loop.

use std::env;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::process;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Context};
use tracing::{debug, info, warn};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use tview::config::ConfigLoader;
use tview::models::Mode;
use tview::{ui, Console};

/// Command line arguments
#[derive(Debug, Default)]
struct AppArgs {
    /// Configuration file path
    config_path: Option<PathBuf>,
    /// Enable debug logging
    debug: bool,
    /// Initial mode
    mode: Option<Mode>,
    /// Initial environment
    env: Option<String>,
    help: bool,
    version: bool,
}

impl AppArgs {
    /// Parse command line arguments
    fn parse<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut app_args = AppArgs::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let path = args.next().ok_or_else(|| anyhow!("Missing config file path"))?;
                    app_args.config_path = Some(PathBuf::from(path));
                }
                "--debug" | "-d" => {
                    app_args.debug = true;
                }
                "--mode" | "-m" => {
                    let mode = args.next().ok_or_else(|| anyhow!("Missing mode"))?;
                    app_args.mode = Some(mode.parse()?);
                }
                "--env" | "-e" => {
                    let env = args.next().ok_or_else(|| anyhow!("Missing environment"))?;
                    app_args.env = Some(env);
                }
                "--help" | "-h" => app_args.help = true,
                "--version" | "-V" => app_args.version = true,
                other if other.starts_with('-') => {
                    return Err(anyhow!("Unknown option: {}", other));
                }
                other => {
                    return Err(anyhow!("Unexpected argument: {}", other));
                }
            }
        }

        Ok(app_args)
    }
}

/// Print help information
fn print_help() {
    println!("tview - environment operations console");
    println!();
    println!("USAGE:");
    println!("    tview [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <PATH>    Path to configuration file");
    println!("    -d, --debug            Enable debug logging");
    println!("    -m, --mode <MODE>      Initial mode (TOML, TKM, TSM, RCM, DEPLOY, ORG)");
    println!("    -e, --env <ENV>        Initial environment");
    println!("    -h, --help             Print this help message");
    println!("    -V, --version          Print version information");
    println!();
    println!("CONFIGURATION:");
    println!("    tview looks for configuration files in the following order:");
    println!("    1. Path specified with --config");
    println!("    2. $TVIEW_CONFIG");
    println!("    3. $XDG_CONFIG_HOME/tview/config.toml");
    println!("    4. ~/.config/tview/config.toml");
    println!("    5. ~/.tview/config.toml");
    println!("    6. Built-in defaults");
    println!();
    println!("ENVIRONMENT:");
    println!("    TVIEW_CONFIG          Path to configuration file");
    println!("    TVIEW_ENV_DIR         Directory of per-environment config files");
    println!("    TVIEW_ACTIVE_CONFIG   Initially active environment config");
    println!("    TVIEW_DEBUG           Enable debug logging (1 or true)");
    println!("    RUST_LOG              Set logging level (error, warn, info, debug, trace)");
}

/// Log to a file; the terminal belongs to the console
fn init_logging(debug: bool) -> Option<PathBuf> {
    let debug = debug
        || env::var("TVIEW_DEBUG").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
    let log_level = if debug { "debug" } else { "info" };
    let env_filter = env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string());

    let log_path = dirs::data_local_dir()
        .unwrap_or_else(env::temp_dir)
        .join("tview")
        .join("tview.log");
    let file = log_path
        .parent()
        .map(fs::create_dir_all)
        .transpose()
        .ok()
        .and_then(|_| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .ok()
        });

    let (writer, path) = match file {
        Some(file) => (BoxMakeWriter::new(Mutex::new(file)), Some(log_path)),
        None => (BoxMakeWriter::new(std::io::sink), None),
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(env_filter))
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    path
}

fn main() -> anyhow::Result<()> {
    let args = AppArgs::parse(env::args().skip(1)).unwrap_or_else(|e| {
        eprintln!("tview: {}", e);
        eprintln!();
        print_help();
        process::exit(2);
    });

    if args.help {
        print_help();
        return Ok(());
    }
    if args.version {
        println!("tview v{}", tview::VERSION);
        return Ok(());
    }

    let log_path = init_logging(args.debug);
    info!("Starting tview v{}", tview::VERSION);
    if let Some(path) = &log_path {
        debug!("Logging to {}", path.display());
    }

    let (config, config_path) = ConfigLoader::load(args.config_path.as_deref())
        .context("Failed to load configuration")?;
    match &config_path {
        Some(path) => info!("Configuration: {}", path.display()),
        None => info!("Configuration: built-in defaults"),
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("tview-exec")
        .build()
        .context("Failed to start async runtime")?;

    let (width, height) = ui::terminal_size();
    let mut console = Console::from_config(&config, runtime.handle().clone(), width, height);

    if let Some(mode) = args.mode {
        console.navigation_mut().set_mode(mode);
    }
    if let Some(env) = &args.env {
        console
            .navigation_mut()
            .set_environment(env)
            .context("Invalid --env")?;
    }

    ui::run(&mut console, config.tick_interval()).context("Terminal session failed")?;

    let environments: Vec<String> = console
        .registry()
        .environments()
        .iter()
        .map(|e| e.name().to_string())
        .collect();
    let cancelled: usize = environments
        .iter()
        .map(|env| console.engine().cancel_all(env))
        .sum();
    if cancelled > 0 {
        warn!("Cancelled {} running command(s) on exit", cancelled);
    }

    runtime.shutdown_timeout(Duration::from_secs(1));
    info!("tview shutdown complete");
    Ok(())
}
