//! Error types for the mori command line.
//!
//! All errors use thiserror; the binary wraps them in anyhow at the top.

use mori_store::{DecodeError, StoreError};
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No `--file` given and no home directory to derive a default from
    #[error("cannot determine home directory; pass --file or set MORI_FILE")]
    NoHomeDirectory,

    /// Format version outside the supported range
    #[error("invalid format version: {0}")]
    FormatVersion(#[source] StoreError),

    /// Clipboard program name is blank
    #[error("clipboard program must not be empty")]
    EmptyClipboard,
}

/// Errors raised while running a command or the interactive session.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The store decoded only partially, so saving it would drop data
    #[error("store '{}' is damaged after {records} records", path.display())]
    PartialLoad {
        /// Store file path
        path: PathBuf,
        /// Records decoded before the error
        records: usize,
        /// Where decoding stopped
        #[source]
        source: DecodeError,
    },

    /// Terminal I/O failed
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The clipboard program could not be started
    #[error("failed to run clipboard program '{program}': {source}")]
    ClipboardSpawn {
        /// Program name
        program: String,
        /// Spawn failure
        #[source]
        source: std::io::Error,
    },

    /// The clipboard program exited unsuccessfully
    #[error("clipboard program '{program}' exited with {status}")]
    ClipboardStatus {
        /// Program name
        program: String,
        /// Exit status
        status: ExitStatus,
    },
}

/// Result type alias for command line operations
pub type Result<T> = std::result::Result<T, CliError>;
