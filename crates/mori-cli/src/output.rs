//! Output formatting for record listings, search results and the menu.
//!
//! Everything is written through a [`Printer`] wrapping any `Write`, so the
//! same rendering serves stdout, the alternate screen and in-memory buffers
//! in tests.

use crate::term::{self, LineMode};
use mori_store::{Collection, RecordRef};
use owo_colors::OwoColorize;
use std::borrow::Cow;
use std::fmt::Display;
use std::io::{self, Write};

/// Names longer than this many bytes are cut in the short view
pub const SHORT_NAME_LIMIT: usize = 35;

/// Prefix for records inside a listing
pub const LIST_PREFIX: &str = "║    ";

/// Prefix for records inside search results
pub const SEARCH_PREFIX: &str = "║      ";

/// Style configuration for output formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputStyle {
    /// Whether to use colors in output
    pub use_color: bool,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self {
            // Check if NO_COLOR env var is set
            use_color: std::env::var_os("NO_COLOR").is_none(),
        }
    }
}

impl OutputStyle {
    /// Create a new output style
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable colors in output
    #[must_use]
    pub const fn no_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

/// Format an error message
pub fn format_error(text: &str, style: OutputStyle) -> String {
    if style.use_color {
        format!("{} {}", "ERROR:".red(), text)
    } else {
        format!("ERROR: {text}")
    }
}

/// Format the menu prompt glyph
pub fn format_glyph(style: OutputStyle) -> String {
    if style.use_color {
        "森".green().to_string()
    } else {
        "森".to_string()
    }
}

/// Which record view a listing uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Index, truncated name and chapter
    Short,
    /// Every field
    Full,
}

/// Display name for the short view, cut to [`SHORT_NAME_LIMIT`] bytes
pub fn short_name(name: &[u8]) -> Cow<'_, str> {
    if name.len() > SHORT_NAME_LIMIT {
        let cut = String::from_utf8_lossy(&name[..SHORT_NAME_LIMIT]);
        Cow::Owned(format!("{cut}..."))
    } else {
        String::from_utf8_lossy(name)
    }
}

/// Line-oriented writer for everything mori prints
#[derive(Debug)]
pub struct Printer<W> {
    out: W,
    style: OutputStyle,
    mode: LineMode,
}

impl<W: Write> Printer<W> {
    /// Printer for plain line output
    pub const fn new(out: W, style: OutputStyle) -> Self {
        Self {
            out,
            style,
            mode: LineMode::Plain,
        }
    }

    /// Borrow the underlying writer
    pub const fn get_ref(&self) -> &W {
        &self.out
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write one terminated line
    pub fn line(&mut self, text: impl Display) -> io::Result<()> {
        write!(self.out, "{text}{}", self.mode.terminator())
    }

    /// Write text without a terminator and flush, leaving the cursor after it
    pub fn prompt(&mut self, text: impl Display) -> io::Result<()> {
        write!(self.out, "{text}")?;
        self.out.flush()
    }

    /// Write an error line
    pub fn error(&mut self, message: impl Display) -> io::Result<()> {
        let text = format_error(&message.to_string(), self.style);
        self.line(text)
    }

    /// Flush the writer
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Clear the screen
    pub fn clear_screen(&mut self) -> io::Result<()> {
        self.out.write_all(term::CLEAR_SCREEN.as_bytes())
    }

    /// Switch to the alternate screen and clear it
    pub fn enter_alt_screen(&mut self) -> io::Result<()> {
        write!(self.out, "{}{}", term::ENTER_ALT_SCREEN, term::CLEAR_SCREEN)?;
        self.mode = LineMode::Screen;
        self.out.flush()
    }

    /// Return to the main screen
    pub fn leave_alt_screen(&mut self) -> io::Result<()> {
        self.out.write_all(term::LEAVE_ALT_SCREEN.as_bytes())?;
        self.mode = LineMode::Plain;
        self.out.flush()
    }

    /// Index, name (cut to [`SHORT_NAME_LIMIT`] bytes) and chapter
    pub fn tree_short(&mut self, index: usize, record: &RecordRef<'_>, prefix: &str) -> io::Result<()> {
        self.line(format_args!("{prefix}Mori_Tree :: struct {{"))?;
        self.line(format_args!("{prefix}  .Index   = {index};"))?;
        self.line(format_args!(
            "{prefix}  .Name    = \"{}\";",
            short_name(record.name())
        ))?;
        self.line(format_args!("{prefix}  .Chapter = {};", record.chapter()))?;
        self.line(format_args!("{prefix}}}"))
    }

    /// Every field of a record
    pub fn tree_full(&mut self, index: usize, record: &RecordRef<'_>, prefix: &str) -> io::Result<()> {
        self.line(format_args!("{prefix}Mori_Tree :: struct {{"))?;
        self.line(format_args!("{prefix}  .Index   = {index};"))?;
        self.line(format_args!(
            "{prefix}  .Name    = \"{}\";",
            record.name_lossy()
        ))?;
        match record.url_lossy() {
            Some(url) => self.line(format_args!("{prefix}  .Url     = \"{url}\";"))?,
            None => self.line(format_args!("{prefix}  .Url     = None;"))?,
        }
        self.line(format_args!("{prefix}  .Chapter = {};", record.chapter()))?;
        self.line(format_args!("{prefix}  .Volume  = {};", record.volume()))?;
        self.line(format_args!("{prefix}}}"))
    }

    fn tree(&mut self, view: View, index: usize, record: &RecordRef<'_>, prefix: &str) -> io::Result<()> {
        match view {
            View::Short => self.tree_short(index, record, prefix),
            View::Full => self.tree_full(index, record, prefix),
        }
    }

    /// The whole collection inside the forest frame
    pub fn forest(&mut self, collection: &Collection, view: View) -> io::Result<()> {
        self.line("╓─<Your Manga Forest>")?;
        for (index, record) in collection.iter().enumerate() {
            self.line(format_args!("╟─ Index {index}"))?;
            self.tree(view, index, &record, LIST_PREFIX)?;
        }
        self.line(format_args!("╙─ Mori_Tree mori[{}];", collection.len()))?;
        self.flush()
    }

    /// Search hits inside the results frame. Returns the number of hits.
    pub fn search_results<'a>(
        &mut self,
        hits: impl Iterator<Item = (usize, RecordRef<'a>)>,
    ) -> io::Result<usize> {
        self.line("╓<Search_Results>")?;
        let mut found = 0;
        for (index, record) in hits {
            self.line(format_args!("╟──◈ Index {index}"))?;
            self.tree_short(index, &record, SEARCH_PREFIX)?;
            found += 1;
        }
        self.line(format_args!("╙ Mori_Tree found[{found}];"))?;
        self.flush()?;
        Ok(found)
    }

    /// The interactive action menu, ending at the prompt
    pub fn actions_menu(&mut self) -> io::Result<()> {
        self.line("╓─Actions:")?;
        self.line("║ ╞ l - Lists all saved items")?;
        self.line("║ ╞ s - Search for an item by their name")?;
        self.line("║ ╞ c - Create new item")?;
        self.line("║ ╞ d - Delete an existing item")?;
        self.line("║ ╞ e - Edit existing item")?;
        self.line("║ ╞ x - Copy url of item or the name if the url is missing")?;
        self.line("║ ╞ i - Get full info of an item")?;
        self.line("║ ╘ q - Quit out of program")?;
        let glyph = format_glyph(self.style);
        self.prompt(format_args!("╙──{glyph}> "))
    }
}
