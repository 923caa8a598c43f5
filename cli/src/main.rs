//! PortWatch CLI - Wait for TCP ports to come up
//!
//! Probes every configured port until it accepts a connection, showing a
//! live status grid (or plain progress lines), then exits.

mod commands;
mod logging;
mod tui;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "portwatch")]
#[command(author, version, about = "Wait for TCP ports to come up")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path (default: ~/.portwatch/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Disable interactive TUI mode
    #[arg(long, global = true)]
    no_tui: bool,

    /// Log filter used when RUST_LOG is unset (e.g. "debug", "portwatch_core=trace")
    #[arg(long, global = true)]
    log_level: Option<String>,
}

/// Overrides applied on top of the config file.
#[derive(Args, Clone, Default)]
struct Targets {
    /// Host to probe
    #[arg(long)]
    host: Option<String>,

    /// Port to wait for; repeat to watch several (replaces configured ports)
    #[arg(short, long = "port", value_parser = clap::value_parser!(u16).range(1..))]
    ports: Vec<u16>,

    /// Connect timeout per attempt, in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait until every port accepts connections (default)
    Wait(Targets),

    /// Probe every port once and report
    Check(Targets),

    /// Show or edit the config file
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Add a port to the watch list
    Add {
        #[arg(value_parser = clap::value_parser!(u16).range(1..))]
        port: u16,
    },
    /// Remove a port from the watch list
    #[command(alias = "rm")]
    Remove { port: u16 },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let command = cli
        .command
        .unwrap_or_else(|| Commands::Wait(Targets::default()));

    let interactive = matches!(command, Commands::Wait(_))
        && !cli.no_tui
        && !cli.json
        && atty::is(atty::Stream::Stdout);
    logging::init(cli.log_level.as_deref(), interactive)?;

    let store = commands::open_store(cli.config)?;

    match command {
        Commands::Wait(targets) => {
            let config = commands::load_config(&store, &targets).await?;
            commands::wait::run(config, cli.json, interactive).await
        }
        Commands::Check(targets) => {
            let config = commands::load_config(&store, &targets).await?;
            commands::check::run(config, cli.json).await
        }
        Commands::Config { action } => {
            match action.unwrap_or(ConfigAction::Show) {
                ConfigAction::Show => commands::config::show(&store, cli.json).await?,
                ConfigAction::Add { port } => commands::config::add(&store, port).await?,
                ConfigAction::Remove { port } => commands::config::remove(&store, port).await?,
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
