//! Interactive menu session.
//!
//! The session owns the loaded [`Collection`] for its whole lifetime and
//! drives it from single-character commands read line by line. Input and
//! output are generic so the whole loop can be scripted in tests.

use crate::clipboard::Clipboard;
use crate::commands::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::config::AppConfig;
use crate::error::{CliError, Result};
use crate::output::{Printer, View};
use mori_store::{Collection, Field, NewRecord, StoreError};
use std::io::{BufRead, Write};
use tracing::{debug, error, info};

/// Chapter count above which the create action asks for a volume
pub const VOLUME_PROMPT_THRESHOLD: u32 = 4;

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user quit; the collection should be saved
    Quit,
    /// Input ended before a quit command; nothing should be saved
    InputClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Interactive session over a collection
#[derive(Debug)]
pub struct Session<R, W, C> {
    collection: Collection,
    input: R,
    printer: Printer<W>,
    clipboard: C,
}

impl<R: BufRead, W: Write, C: Clipboard> Session<R, W, C> {
    /// Create a session that owns `collection`
    pub const fn new(collection: Collection, input: R, printer: Printer<W>, clipboard: C) -> Self {
        Self {
            collection,
            input,
            printer,
            clipboard,
        }
    }

    /// The collection being edited
    pub const fn collection(&self) -> &Collection {
        &self.collection
    }

    /// The output printer
    pub const fn printer(&self) -> &Printer<W> {
        &self.printer
    }

    /// The clipboard
    pub const fn clipboard(&self) -> &C {
        &self.clipboard
    }

    /// Give up the session and return the collection
    pub fn into_collection(self) -> Collection {
        self.collection
    }

    /// Run the menu loop on the alternate screen until quit or end of input
    pub fn run(&mut self) -> Result<SessionEnd> {
        self.printer.enter_alt_screen()?;
        let end = self.menu_loop();
        self.printer.leave_alt_screen()?;
        end
    }

    fn menu_loop(&mut self) -> Result<SessionEnd> {
        loop {
            self.printer.clear_screen()?;
            self.printer.actions_menu()?;

            let Some(action) = self.read_action()? else {
                return Ok(SessionEnd::InputClosed);
            };
            debug!("Action '{}'", action);

            if self.handle_action(action)? == Flow::Quit {
                return Ok(SessionEnd::Quit);
            }

            // Hold the result on screen until the next line
            self.printer.flush()?;
            self.read_line()?;
        }
    }

    fn read_line(&mut self) -> Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        if self.input.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    /// Read a trimmed line, `None` at end of input
    fn read_trimmed(&mut self) -> Result<Option<Vec<u8>>> {
        Ok(self.read_line()?.map(|line| line.trim_ascii().to_vec()))
    }

    /// First non-blank character of the next non-blank line
    fn read_action(&mut self) -> Result<Option<char>> {
        loop {
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            if let Some(action) = String::from_utf8_lossy(line.trim_ascii_start()).chars().next() {
                return Ok(Some(action));
            }
        }
    }

    /// Prompt for an index. `q`, end of input and invalid numbers cancel.
    fn read_index(&mut self, prompt: &str) -> Result<Option<usize>> {
        self.printer.prompt(format_args!("{prompt} "))?;
        let Some(line) = self.read_trimmed()? else {
            return Ok(None);
        };
        if line.first() == Some(&b'q') {
            return Ok(None);
        }

        let text = String::from_utf8_lossy(&line);
        if let Ok(index) = text.parse::<usize>() {
            Ok(Some(index))
        } else {
            self.printer.error(format_args!("invalid index '{text}'"))?;
            Ok(None)
        }
    }

    /// Prompt for an index that must exist in the collection
    fn read_existing_index(&mut self, prompt: &str) -> Result<Option<usize>> {
        let Some(index) = self.read_index(prompt)? else {
            return Ok(None);
        };
        if let Err(e) = self.collection.get(index) {
            self.printer.error(&e)?;
            return Ok(None);
        }
        Ok(Some(index))
    }

    fn handle_action(&mut self, action: char) -> Result<Flow> {
        match action {
            'q' => return Ok(Flow::Quit),
            'l' => {
                self.printer.clear_screen()?;
                self.printer.forest(&self.collection, View::Short)?;
            }
            's' => self.search()?,
            'c' => self.create()?,
            'd' => self.delete()?,
            'e' => self.edit()?,
            'x' => self.copy()?,
            'i' => self.info()?,
            other => self
                .printer
                .line(format_args!("Unknown command: '{other}'"))?,
        }
        Ok(Flow::Continue)
    }

    fn search(&mut self) -> Result<()> {
        self.printer.clear_screen()?;
        self.printer.prompt("Search = ")?;
        let Some(term) = self.read_trimmed()? else {
            return Ok(());
        };
        self.printer.search_results(self.collection.find(&term))?;
        Ok(())
    }

    fn create(&mut self) -> Result<()> {
        self.printer.clear_screen()?;

        self.printer.prompt("Name :: ")?;
        let name = self.read_trimmed()?.unwrap_or_default();
        if name.is_empty() {
            info!("Action cancelled");
            return Ok(());
        }

        self.printer.prompt("Url :: ")?;
        let url = self.read_trimmed()?.unwrap_or_default();

        self.printer.prompt("Chapter :: ")?;
        let chapter = match self.read_counter(Field::Chapter)? {
            Ok(chapter) => chapter.unwrap_or(0),
            Err(e) => {
                self.printer.error(&e)?;
                return Ok(());
            }
        };

        let mut record = NewRecord::new(name).with_url(url).with_chapter(chapter);
        if chapter > VOLUME_PROMPT_THRESHOLD {
            self.printer.prompt("Volume :: ")?;
            match self.read_counter(Field::Volume)? {
                Ok(Some(volume)) => record = record.with_volume(volume),
                Ok(None) => {}
                Err(e) => {
                    self.printer.error(&e)?;
                    return Ok(());
                }
            }
        }

        let index = self.collection.push(&record)?;
        info!("Planted tree {}", index);
        Ok(())
    }

    /// Read a counter. The outer result is I/O, the inner one parsing.
    fn read_counter(&mut self, field: Field) -> Result<std::result::Result<Option<u32>, StoreError>> {
        let line = self.read_trimmed()?.unwrap_or_default();
        if line.is_empty() {
            return Ok(Ok(None));
        }
        let text = String::from_utf8_lossy(&line);
        Ok(text
            .parse::<u32>()
            .map(Some)
            .map_err(|source| StoreError::InvalidNumber {
                field: field.as_str(),
                value: text.to_string(),
                source,
            }))
    }

    fn delete(&mut self) -> Result<()> {
        self.printer.clear_screen()?;
        let Some(index) = self.read_existing_index("Delete_Index =")? else {
            return Ok(());
        };
        info!("Chopping tree {}", index);
        self.collection.remove_at(index);
        Ok(())
    }

    fn info(&mut self) -> Result<()> {
        self.printer.clear_screen()?;
        let Some(index) = self.read_existing_index("Index =")? else {
            return Ok(());
        };
        let record = self.collection.get(index)?;
        self.printer.tree_full(index, &record, "")?;
        Ok(())
    }

    fn copy(&mut self) -> Result<()> {
        self.printer.clear_screen()?;
        let Some(index) = self.read_existing_index("Copy_Index =")? else {
            return Ok(());
        };

        let record = self.collection.get(index)?;
        let name = record.name_lossy().into_owned();
        let (what, text) = match record.url_lossy() {
            Some(url) => ("url", url.into_owned()),
            None => ("name", name.clone()),
        };

        match self.clipboard.copy(&text) {
            Ok(()) => info!("Copied {} for {}", what, name),
            Err(e) => {
                error!("Failed to copy {} for {}: {}", what, name, e);
                self.printer
                    .error(format_args!("Failed to copy {what} for {name}: {e}"))?;
            }
        }
        Ok(())
    }

    fn edit(&mut self) -> Result<()> {
        self.printer.clear_screen()?;
        let Some(index) = self.read_existing_index("Edit_Index =")? else {
            return Ok(());
        };

        let mut last_error: Option<String> = None;
        loop {
            self.printer.clear_screen()?;
            if let Some(message) = last_error.take() {
                self.printer.error(message)?;
            }

            let record = self.collection.get(index)?;
            self.printer.tree_full(index, &record, "")?;
            self.printer.prompt("Edit_Field_Name = ")?;

            let Some(line) = self.read_trimmed()? else {
                return Ok(());
            };
            if line.is_empty() {
                continue;
            }
            let name = String::from_utf8_lossy(&line).to_ascii_lowercase();
            if name == "quit" || name == "q" {
                return Ok(());
            }

            let field = match name.parse::<Field>() {
                Ok(field) => field,
                Err(e) if e.is_recoverable() => {
                    last_error = Some(e.to_string());
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            self.printer.prompt(format_args!("tree->{field} = "))?;
            let Some(value) = self.read_trimmed()? else {
                return Ok(());
            };

            let outcome = match field {
                Field::Name => self.collection.set_name(index, &value),
                Field::Url => self.collection.set_url(index, &value),
                Field::Chapter | Field::Volume => {
                    self.collection
                        .edit(index, field, &String::from_utf8_lossy(&value))
                }
            };
            match outcome {
                Ok(outcome) => debug!("Edited {} of tree {}: {:?}", field, index, outcome),
                Err(e) if e.is_recoverable() => last_error = Some(e.to_string()),
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Load the store, run an interactive session on it and save on quit.
///
/// Refuses to start when the store cannot be loaded or decodes only
/// partially, so a file that could not be fully read is never overwritten.
/// Returns the process exit code.
pub fn run<R, W, C>(config: &AppConfig, input: R, output: W, clipboard: C) -> Result<u8>
where
    R: BufRead,
    W: Write,
    C: Clipboard,
{
    let (collection, report) = Collection::load(&config.store_path, &config.load_options)?;
    if let Some(source) = report.decode_error {
        return Err(CliError::PartialLoad {
            path: config.store_path.clone(),
            records: report.records_loaded,
            source,
        });
    }

    let mut session = Session::new(
        collection,
        input,
        Printer::new(output, config.style),
        clipboard,
    );

    match session.run()? {
        SessionEnd::Quit => {
            info!("Saving store file...");
            match session.collection().save(&config.store_path) {
                Ok(()) => info!("Saved your 森!"),
                Err(e) => error!("Failed to save your 森: {}", e),
            }
            Ok(EXIT_SUCCESS)
        }
        SessionEnd::InputClosed => {
            error!("Input closed before quit, changes discarded");
            Ok(EXIT_FAILURE)
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::output::OutputStyle;
    use crate::term;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[derive(Debug, Default)]
    struct FakeClipboard {
        copied: Vec<String>,
        fail: bool,
    }

    impl Clipboard for FakeClipboard {
        fn copy(&mut self, text: &str) -> Result<()> {
            if self.fail {
                return Err(CliError::Io(std::io::Error::other("no clipboard")));
            }
            self.copied.push(text.to_string());
            Ok(())
        }
    }

    type TestSession = Session<Cursor<Vec<u8>>, Vec<u8>, FakeClipboard>;

    fn session(collection: Collection, script: &str) -> TestSession {
        Session::new(
            collection,
            Cursor::new(script.as_bytes().to_vec()),
            Printer::new(Vec::new(), OutputStyle::new().no_color()),
            FakeClipboard::default(),
        )
    }

    fn output(session: &TestSession) -> String {
        String::from_utf8_lossy(session.printer().get_ref()).into_owned()
    }

    fn sample() -> Collection {
        let mut collection = Collection::new();
        collection
            .push(&NewRecord::new("Berserk").with_url("https://example.org/berserk"))
            .unwrap();
        collection.push(&NewRecord::new("Blame!")).unwrap();
        collection.push(&NewRecord::new("Claymore")).unwrap();
        collection
    }

    fn names(collection: &Collection) -> Vec<String> {
        collection
            .iter()
            .map(|r| r.name_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_quit_uses_alt_screen() {
        let mut session = session(Collection::new(), "q\n");
        assert_eq!(session.run().unwrap(), SessionEnd::Quit);

        let out = output(&session);
        assert!(out.starts_with(term::ENTER_ALT_SCREEN));
        assert!(out.ends_with(term::LEAVE_ALT_SCREEN));
        assert!(out.contains("║ ╘ q - Quit out of program"));
    }

    #[test]
    fn test_end_of_input_without_quit() {
        let mut session = session(sample(), "l\n");
        assert_eq!(session.run().unwrap(), SessionEnd::InputClosed);
        assert!(output(&session).contains("╙─ Mori_Tree mori[3];"));
    }

    #[test]
    fn test_blank_lines_before_action() {
        let mut session = session(sample(), "\n   \n\t l\n\nq\n");
        assert_eq!(session.run().unwrap(), SessionEnd::Quit);
        assert!(output(&session).contains("╟─ Index 2"));
    }

    #[test]
    fn test_unknown_command() {
        let mut session = session(Collection::new(), "z\n\nq\n");
        session.run().unwrap();
        assert!(output(&session).contains("Unknown command: 'z'"));
    }

    #[test]
    fn test_create_with_volume() {
        let mut session = session(
            Collection::new(),
            "c\n  Berserk \nhttps://example.org\n374\n42\n\nq\n",
        );
        session.run().unwrap();

        let collection = session.into_collection();
        let record = collection.get(0).unwrap();
        assert_eq!(record.name(), b"Berserk");
        assert_eq!(record.url(), Some(&b"https://example.org"[..]));
        assert_eq!(record.chapter(), 374);
        assert_eq!(record.volume(), 42);
    }

    #[test]
    fn test_create_low_chapter_skips_volume() {
        let mut session = session(Collection::new(), "c\nBlame!\n\n3\n\nq\n");
        session.run().unwrap();
        assert!(!output(&session).contains("Volume :: "));

        let collection = session.into_collection();
        let record = collection.get(0).unwrap();
        assert_eq!(record.url(), None);
        assert_eq!(record.chapter(), 3);
        assert_eq!(record.volume(), 1);
    }

    #[test]
    fn test_create_cancelled_on_empty_name() {
        let mut session = session(Collection::new(), "c\n\n\nq\n");
        session.run().unwrap();
        assert!(session.collection().is_empty());
    }

    #[test]
    fn test_create_rejects_bad_chapter() {
        let mut session = session(Collection::new(), "c\nBlame!\n\nten\n\nq\n");
        session.run().unwrap();
        assert!(output(&session).contains("ERROR: invalid number for chapter: 'ten'"));
        assert!(session.collection().is_empty());
    }

    #[test]
    fn test_delete() {
        let mut session = session(sample(), "d\n1\n\nq\n");
        session.run().unwrap();
        assert_eq!(names(session.collection()), ["Berserk", "Claymore"]);
    }

    #[test]
    fn test_delete_out_of_range_and_cancel() {
        let mut session = session(sample(), "d\n7\n\nd\nq\n\nd\nabc\n\nq\n");
        session.run().unwrap();

        let out = output(&session);
        assert!(out.contains("ERROR: index 7 out of bounds for collection of length 3"));
        assert!(out.contains("ERROR: invalid index 'abc'"));
        assert_eq!(session.collection().len(), 3);
    }

    #[test]
    fn test_info() {
        let mut session = session(sample(), "i\n0\n\nq\n");
        session.run().unwrap();
        let out = output(&session);
        assert!(out.contains("  .Url     = \"https://example.org/berserk\";"));
        assert!(out.contains("  .Volume  = 1;"));
    }

    #[test]
    fn test_search() {
        let mut session = session(sample(), "s\n  BL \n\nq\n");
        session.run().unwrap();
        let out = output(&session);
        assert!(out.contains("╟──◈ Index 1"));
        assert!(!out.contains("╟──◈ Index 0"));
        assert!(out.contains("╙ Mori_Tree found[1];"));
    }

    #[test]
    fn test_edit_fields() {
        let script = "e\n0\nname\nBerz\nCHAPTERS\n12\nvolume\n\nurl\n\nrating\nq\n\nq\n";
        let mut session = session(sample(), script);
        session.run().unwrap();

        let out = output(&session);
        assert!(out.contains("tree->name = "));
        assert!(out.contains("tree->chapter = "));
        assert!(out.contains("ERROR: unknown field: rating"));

        let collection = session.into_collection();
        let record = collection.get(0).unwrap();
        assert_eq!(record.name(), b"Berz");
        assert_eq!(record.name_bytes(), b"Berz\0\0\0");
        assert_eq!(record.chapter(), 12);
        assert_eq!(record.volume(), 1);
        assert_eq!(record.url(), None);
    }

    #[test]
    fn test_edit_invalid_number_shown_next_iteration() {
        let mut session = session(sample(), "e\n1\nchapter\n-3\nquit\n\nq\n");
        session.run().unwrap();
        assert!(output(&session).contains("ERROR: invalid number for chapter: '-3'"));
        assert_eq!(session.collection().get(1).unwrap().chapter(), 0);
    }

    #[test]
    fn test_copy_prefers_url() {
        let mut session = session(sample(), "x\n0\n\nx\n2\n\nq\n");
        session.run().unwrap();
        assert_eq!(
            session.clipboard().copied,
            ["https://example.org/berserk", "Claymore"]
        );
    }

    #[test]
    fn test_run_refuses_partial_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig {
            store_path: dir.path().join("mori-mori"),
            load_options: mori_store::LoadOptions::default(),
            clipboard: "true".to_string(),
            style: OutputStyle::new().no_color(),
        };
        sample().save(&config.store_path).unwrap();
        let mut data = std::fs::read(&config.store_path).unwrap();
        data.extend_from_slice(&[0x01, 0x02]);
        std::fs::write(&config.store_path, &data).unwrap();

        let mut out = Vec::new();
        let err = run(
            &config,
            Cursor::new(b"d\n0\n\nq\n".to_vec()),
            &mut out,
            FakeClipboard::default(),
        )
        .expect_err("partial load must not start a session");
        assert!(matches!(err, CliError::PartialLoad { records: 3, .. }));
        assert!(out.is_empty());
        assert_eq!(std::fs::read(&config.store_path).unwrap(), data);
    }

    #[test]
    fn test_copy_failure_reported() {
        let mut session = Session::new(
            sample(),
            Cursor::new(b"x\n1\n\nq\n".to_vec()),
            Printer::new(Vec::new(), OutputStyle::new().no_color()),
            FakeClipboard {
                copied: Vec::new(),
                fail: true,
            },
        );
        assert_eq!(session.run().unwrap(), SessionEnd::Quit);
        assert!(output(&session).contains("ERROR: Failed to copy name for Blame!"));
    }
}
