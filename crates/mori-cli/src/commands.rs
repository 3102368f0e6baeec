//! One-shot commands: `version`, `list`, `list-full` and `search`

use crate::config::{AppConfig, Command, STORE_FILE_NAME};
use crate::error::Result;
use crate::output::{Printer, View};
use mori_store::{Collection, FormatVersion};
use std::io::Write;
use tracing::{error, warn};

/// Process exit code for success
pub const EXIT_SUCCESS: u8 = 0;

/// Process exit code for failure
pub const EXIT_FAILURE: u8 = 1;

/// Load the store for read-only display.
///
/// A file that cannot be read is ignored with a warning and an empty
/// collection is shown instead.
pub fn load_for_display(config: &AppConfig) -> Collection {
    match Collection::load(&config.store_path, &config.load_options) {
        Ok((collection, _)) => collection,
        Err(e) => {
            warn!(
                "Ignoring existing data in '{}': {}",
                config.store_path.display(),
                e
            );
            Collection::with_version(config.format_version())
        }
    }
}

/// Run a one-shot command, writing to `out`. Returns the exit code.
pub fn execute<W: Write>(command: &Command, config: &AppConfig, out: W) -> Result<u8> {
    let mut printer = Printer::new(out, config.style);

    match command {
        Command::Version => {
            printer.line(format_args!("Program: v{}", env!("CARGO_PKG_VERSION")))?;
            printer.line(format_args!(
                "{STORE_FILE_NAME}: {:#04x}",
                FormatVersion::LATEST.as_byte()
            ))?;
        }
        Command::List => {
            let collection = load_for_display(config);
            printer.forest(&collection, View::Short)?;
        }
        Command::ListFull => {
            let collection = load_for_display(config);
            printer.forest(&collection, View::Full)?;
        }
        Command::Search { terms } => {
            if terms.is_empty() {
                error!("Missing search term(s)");
                printer.line("Usage: mori search <search-terms...>")?;
                return Ok(EXIT_FAILURE);
            }
            let collection = load_for_display(config);
            let term = terms.join(" ");
            printer.search_results(collection.find(term.as_bytes()))?;
        }
    }

    printer.flush()?;
    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::output::OutputStyle;
    use mori_store::{LoadOptions, NewRecord};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> AppConfig {
        AppConfig {
            store_path: dir.path().join("mori-mori"),
            load_options: LoadOptions::default(),
            clipboard: "true".to_string(),
            style: OutputStyle::new().no_color(),
        }
    }

    fn run(command: &Command, config: &AppConfig) -> (u8, String) {
        let mut out = Vec::new();
        let code = execute(command, config, &mut out).unwrap();
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_version() {
        let dir = TempDir::new().unwrap();
        let (code, out) = run(&Command::Version, &config(&dir));
        assert_eq!(code, EXIT_SUCCESS);
        assert_eq!(
            out,
            format!("Program: v{}\nmori-mori: 0x01\n", env!("CARGO_PKG_VERSION"))
        );
        assert!(!dir.path().join("mori-mori").exists());
    }

    #[test]
    fn test_list_bootstraps_file() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let (code, out) = run(&Command::List, &config);
        assert_eq!(code, EXIT_SUCCESS);
        assert_eq!(out, "╓─<Your Manga Forest>\n╙─ Mori_Tree mori[0];\n");
        assert_eq!(fs::read(&config.store_path).unwrap(), b"MORI\x45\x00");
    }

    #[test]
    fn test_list_ignores_unreadable_file() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        fs::write(&config.store_path, b"garbage").unwrap();

        let (code, out) = run(&Command::ListFull, &config);
        assert_eq!(code, EXIT_SUCCESS);
        assert!(out.ends_with("╙─ Mori_Tree mori[0];\n"));
        assert_eq!(fs::read(&config.store_path).unwrap(), b"garbage");
    }

    #[test]
    fn test_search_joins_terms() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let mut collection = Collection::new();
        for name in ["One Piece", "One Punch-Man", "Piece of Cake"] {
            collection.push(&NewRecord::new(name)).unwrap();
        }
        collection.save(&config.store_path).unwrap();

        let command = Command::Search {
            terms: vec!["one".to_string(), "PIECE".to_string()],
        };
        let (code, out) = run(&command, &config);
        assert_eq!(code, EXIT_SUCCESS);
        assert!(out.contains("╟──◈ Index 0"));
        assert!(!out.contains("Index 1"));
        assert!(!out.contains("Index 2"));
        assert!(out.ends_with("╙ Mori_Tree found[1];\n"));
    }

    #[test]
    fn test_search_without_terms() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let (code, out) = run(&Command::Search { terms: Vec::new() }, &config);
        assert_eq!(code, EXIT_FAILURE);
        assert_eq!(out, "Usage: mori search <search-terms...>\n");
        assert!(!config.store_path.exists());
    }
}
