//! Editable record fields

use crate::error::StoreError;
use std::str::FromStr;

/// A field that can be edited in place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Record name
    Name,
    /// Record url
    Url,
    /// Chapter counter
    Chapter,
    /// Volume counter
    Volume,
}

impl Field {
    /// Canonical lower-case field name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Url => "url",
            Self::Chapter => "chapter",
            Self::Volume => "volume",
        }
    }
}

impl FromStr for Field {
    type Err = StoreError;

    /// Accepts `name`, `url`, `chapter`/`chapters` and `volume`/`volumes`,
    /// ignoring ASCII case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = s.trim().to_ascii_lowercase();
        match field.as_str() {
            "name" => Ok(Self::Name),
            "url" => Ok(Self::Url),
            "chapter" | "chapters" => Ok(Self::Chapter),
            "volume" | "volumes" => Ok(Self::Volume),
            _ => Err(StoreError::UnknownField(field)),
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an edit did to the record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Text overwritten inside its existing view, remainder zero-padded
    InPlace,
    /// Text appended to the backing buffer and the view repointed
    Grown,
    /// Url bytes zero-filled
    Cleared,
    /// Counter replaced
    Set,
    /// Empty input, nothing changed
    Unchanged,
}
