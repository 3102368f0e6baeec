//! Terminal front end for the mori reading tracker.
//!
//! Library half of the `mori` binary. It owns everything between the command
//! line and the record store:
//! - `config`: command line parsing and validated settings
//! - `commands`: the one-shot `version`, `list`, `list-full` and `search`
//! - `interactive`: the menu session that edits and saves the collection
//! - `output`: listings, search results and the menu
//! - `clipboard`: the copy hook
//!
//! # Example
//!
//! ```no_run
//! use mori_cli::{AppConfig, Cli, commands};
//!
//! fn main() -> anyhow::Result<()> {
//!     let cli = Cli::from_args();
//!     let config = AppConfig::from_cli(&cli)?;
//!
//!     if let Some(command) = &cli.command {
//!         commands::execute(command, &config, std::io::stdout().lock())?;
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod clipboard;
pub mod commands;
pub mod config;
pub mod error;
pub mod interactive;
pub mod output;
pub mod term;

pub use clipboard::{Clipboard, CommandClipboard};
pub use config::{AppConfig, Cli, Command};
pub use error::{CliError, ConfigError, Result};
pub use interactive::{Session, SessionEnd};
pub use output::{OutputStyle, Printer};
