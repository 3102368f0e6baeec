//! ANSI escape sequences used by the interactive screen

/// Switch to the alternate screen buffer
pub const ENTER_ALT_SCREEN: &str = "\x1b[?1049h";

/// Return to the main screen buffer
pub const LEAVE_ALT_SCREEN: &str = "\x1b[?1049l";

/// Clear the whole screen and move the cursor home
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Move the cursor to the start of the next line
pub const NEXT_LINE: &str = "\x1b[1E";

/// How lines are terminated on the output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineMode {
    /// Plain `\n`, for batch output and pipes
    #[default]
    Plain,
    /// Cursor movement, for the alternate screen
    Screen,
}

impl LineMode {
    /// The terminator written after each line
    pub const fn terminator(self) -> &'static str {
        match self {
            Self::Plain => "\n",
            Self::Screen => NEXT_LINE,
        }
    }
}
