//! mori binary entry point.
//!
//! This is a thin wrapper around the mori-cli library that:
//! 1. Parses command-line arguments
//! 2. Initializes logging
//! 3. Validates configuration
//! 4. Runs a one-shot command or the interactive session

use anyhow::{Context, Result};
use mori_cli::{AppConfig, Cli, CommandClipboard, commands, interactive};
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::from_args();

    // Logs go to stderr so they never mix with listings or the menu
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<u8> {
    let config = AppConfig::from_cli(cli).context("invalid configuration")?;
    tracing::debug!("Using store file '{}'", config.store_path.display());

    let code = match &cli.command {
        Some(command) => commands::execute(command, &config, io::stdout().lock())?,
        None => interactive::run(
            &config,
            io::stdin().lock(),
            io::stdout().lock(),
            CommandClipboard::new(&config.clipboard),
        )
        .with_context(|| format!("session on '{}' failed", config.store_path.display()))?,
    };
    Ok(code)
}
