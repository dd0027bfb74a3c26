//! wakedesk: run a hotel wake-up-call desk from the terminal.
//!
//! ```bash
//! wakedesk run
//! wakedesk run --seed 7 --max-guests 20 --unit-millis 100
//! wakedesk run --config desk.toml --json
//! wakedesk check-config desk.toml
//! ```
//!
//! Ctrl+C ends a session cleanly: the waiter is cancelled, pending calls are
//! reset, and the final counts are printed.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use wakedesk::{ConsoleReporter, Desk, DeskConfig};

#[derive(Parser, Debug)]
#[command(
    name = "wakedesk",
    version,
    about = "Hotel wake-up-call desk",
    long_about = "Guests arrive at random and register wake-up calls; a waiter\n\
        delivers each call when it falls due. Press Ctrl+C to close the desk."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output as JSON instead of human-readable text
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the desk and serve guests until interrupted
    Run(RunArgs),

    /// Validate a desk config file without running
    CheckConfig(CheckConfigArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// TOML config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of pending wake-up calls
    #[arg(long)]
    capacity: Option<usize>,

    /// Seed for reproducible guests
    #[arg(long)]
    seed: Option<u64>,

    /// Stop admitting after this many guests and exit once all are woken
    #[arg(long)]
    max_guests: Option<u64>,

    /// Length of one time unit in milliseconds
    #[arg(long)]
    unit_millis: Option<u64>,
}

#[derive(Args, Debug)]
struct CheckConfigArgs {
    /// Path to the TOML config file
    config: PathBuf,
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wakedesk=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<DeskConfig, String> {
    path.map_or_else(
        || Ok(DeskConfig::default()),
        |path| DeskConfig::from_toml_file(path).map_err(|e| e.to_string()),
    )
}

fn cmd_run(args: RunArgs, json: bool) -> Result<(), String> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(capacity) = args.capacity {
        config = config.with_capacity(capacity);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(max) = args.max_guests {
        config = config.with_max_guests(max);
    }
    if let Some(unit) = args.unit_millis {
        config = config.with_unit_millis(unit);
    }
    if json {
        config = config.with_json(true);
    }

    let reporter = ConsoleReporter::stdout(config.json);
    let mut desk = Desk::new(config, reporter).map_err(|e| e.to_string())?;
    #[cfg(unix)]
    {
        let stop = wakedesk::desk::install_interrupt_handler()
            .map_err(|e| format!("Failed to install interrupt handler: {e}"))?;
        desk = desk.with_stop_flag(stop);
    }
    let summary = desk.run().map_err(|e| e.to_string())?;

    tracing::info!(
        guests = summary.guests,
        registered = summary.registered,
        rejected = summary.rejected,
        delivered = summary.delivered,
        "session summary"
    );
    Ok(())
}

#[allow(clippy::needless_pass_by_value)]
fn cmd_check_config(args: CheckConfigArgs, json: bool) -> Result<(), String> {
    let config = DeskConfig::from_toml_file(&args.config).map_err(|e| e.to_string())?;
    if json {
        let pretty = serde_json::to_string_pretty(&config).unwrap_or_default();
        println!("{pretty}");
    } else {
        println!("Config '{}' is valid", args.config.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Run(args) => cmd_run(args, cli.json),
        Command::CheckConfig(args) => cmd_check_config(args, cli.json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("Error: {msg}");
            ExitCode::FAILURE
        }
    }
}
