//! Command line parsing and application configuration.
//!
//! Every option can also be given through an environment variable:
//!
//! | option | environment |
//! |---|---|
//! | `--file` | `MORI_FILE` |
//! | `--strict-trailing` | `MORI_STRICT_TRAILING` |
//! | `--format-version` | `MORI_FORMAT_VERSION` |
//! | `--clipboard` | `MORI_CLIPBOARD` |
//! | `--log-level` | `MORI_LOG` |
//!
//! `NO_COLOR` disables colored output the same way `--no-color` does.

use crate::error::ConfigError;
use crate::output::OutputStyle;
use clap::{Parser, Subcommand};
use mori_store::{FormatVersion, LoadOptions, TrailingBytePolicy};
use std::path::PathBuf;

/// Name of the store file under the user's config directory
pub const STORE_FILE_NAME: &str = "mori-mori";

/// Default clipboard program
pub const DEFAULT_CLIPBOARD: &str = "wl-copy";

/// Command line arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mori",
    about = "Track reading progress from the terminal",
    long_about = "Track reading progress from the terminal. Without a command, mori starts an \
                  interactive menu and saves the collection when you quit.",
    version
)]
pub struct Cli {
    /// Store file (defaults to $HOME/.config/mori-mori)
    #[arg(long, global = true, env = "MORI_FILE")]
    pub file: Option<PathBuf>,

    /// Treat a stray byte after the last record as a decode error
    #[arg(long, global = true, env = "MORI_STRICT_TRAILING")]
    pub strict_trailing: bool,

    /// Format version written when the store file is created
    #[arg(
        long,
        global = true,
        env = "MORI_FORMAT_VERSION",
        default_value_t = 0,
        value_parser = clap::value_parser!(u8).range(0..=1)
    )]
    pub format_version: u8,

    /// Program that receives copied text as its argument
    #[arg(long, global = true, env = "MORI_CLIPBOARD", default_value = DEFAULT_CLIPBOARD)]
    pub clipboard: String,

    /// Log filter directive, e.g. `warn` or `mori_store=debug`
    #[arg(long, global = true, env = "MORI_LOG", default_value = "warn")]
    pub log_level: String,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// One-shot commands. Without one, the interactive menu starts.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print program and file format versions
    Version,
    /// List every record in short form
    List,
    /// List every record with all fields
    ListFull,
    /// Search record names, ignoring ASCII case
    Search {
        /// Terms joined with single spaces into one search string
        terms: Vec<String>,
    },
}

impl Cli {
    /// Parse configuration from command-line arguments.
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }
}

/// Validated settings derived from [`Cli`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Resolved store file path
    pub store_path: PathBuf,
    /// Options handed to the store when loading
    pub load_options: LoadOptions,
    /// Clipboard program
    pub clipboard: String,
    /// Output styling
    pub style: OutputStyle,
}

impl AppConfig {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - no store file is given and the home directory is unknown
    /// - the format version is not supported
    /// - the clipboard program is blank
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let store_path = match &cli.file {
            Some(path) => path.clone(),
            None => default_store_path().ok_or(ConfigError::NoHomeDirectory)?,
        };

        let version =
            FormatVersion::from_byte(cli.format_version).map_err(ConfigError::FormatVersion)?;

        let trailing_policy = if cli.strict_trailing {
            TrailingBytePolicy::Strict
        } else {
            TrailingBytePolicy::Lenient
        };

        let clipboard = cli.clipboard.trim();
        if clipboard.is_empty() {
            return Err(ConfigError::EmptyClipboard);
        }

        let style = if cli.no_color {
            OutputStyle::new().no_color()
        } else {
            OutputStyle::new()
        };

        Ok(Self {
            store_path,
            load_options: LoadOptions::default()
                .with_trailing_policy(trailing_policy)
                .with_bootstrap_version(version),
            clipboard: clipboard.to_string(),
            style,
        })
    }

    /// Version written to newly created store files
    pub const fn format_version(&self) -> FormatVersion {
        self.load_options.bootstrap_version
    }
}

/// `$HOME/.config/mori-mori`
pub fn default_store_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join(STORE_FILE_NAME))
}
