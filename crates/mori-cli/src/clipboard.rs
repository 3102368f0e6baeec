//! Clipboard hook for the copy action

use crate::error::{CliError, Result};
use std::process::{Command, Stdio};
use tracing::debug;

/// Destination for copied text
pub trait Clipboard {
    /// Place `text` on the clipboard
    fn copy(&mut self, text: &str) -> Result<()>;
}

/// Clipboard backed by an external program that takes the text as its
/// single argument, such as `wl-copy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandClipboard {
    program: String,
}

impl CommandClipboard {
    /// Use `program` for copying
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Clipboard for CommandClipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        debug!("Running {} with {} bytes", self.program, text.len());
        let status = Command::new(&self.program)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()
            .map_err(|source| CliError::ClipboardSpawn {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(CliError::ClipboardStatus {
                program: self.program.clone(),
                status,
            })
        }
    }
}
