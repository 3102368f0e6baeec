//! Error types for the record store

use thiserror::Error;

/// Errors raised while decoding a single record frame.
///
/// Every variant carries the absolute buffer offset where decoding stopped so
/// a corrupt file can be inspected with a hex viewer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Fewer than four bytes were left for the name length prefix
    #[error("truncated name length at offset {offset}")]
    TruncatedNameLength {
        /// Offset of the length prefix
        offset: usize,
    },

    /// The name length prefix points past the end of the buffer
    #[error("truncated name at offset {offset}: expected {expected} bytes, {available} available")]
    TruncatedName {
        /// Offset of the name bytes
        offset: usize,
        /// Declared name length
        expected: usize,
        /// Bytes actually left
        available: usize,
    },

    /// Fewer than four bytes were left for the url length prefix
    #[error("truncated url length at offset {offset}")]
    TruncatedUrlLength {
        /// Offset of the length prefix
        offset: usize,
    },

    /// The url length prefix points past the end of the buffer
    #[error("truncated url at offset {offset}: expected {expected} bytes, {available} available")]
    TruncatedUrl {
        /// Offset of the url bytes
        offset: usize,
        /// Declared url length
        expected: usize,
        /// Bytes actually left
        available: usize,
    },

    /// Fewer than four bytes were left for the chapter counter
    #[error("truncated chapter at offset {offset}")]
    TruncatedChapter {
        /// Offset of the counter
        offset: usize,
    },

    /// Fewer than four bytes were left for the volume counter
    #[error("truncated volume at offset {offset}")]
    TruncatedVolume {
        /// Offset of the counter
        offset: usize,
    },

    /// A single non-newline byte trails the last frame (strict policy only)
    #[error("stray trailing byte {byte:#04x} at offset {offset}")]
    StrayTrailingByte {
        /// Offset of the byte
        offset: usize,
        /// The byte value
        byte: u8,
    },
}

impl DecodeError {
    /// Offset in the backing buffer where decoding failed
    pub const fn offset(&self) -> usize {
        match self {
            Self::TruncatedNameLength { offset }
            | Self::TruncatedName { offset, .. }
            | Self::TruncatedUrlLength { offset }
            | Self::TruncatedUrl { offset, .. }
            | Self::TruncatedChapter { offset }
            | Self::TruncatedVolume { offset }
            | Self::StrayTrailingByte { offset, .. } => *offset,
        }
    }
}

/// Errors that can occur while loading, editing or saving a collection
#[derive(Debug, Error)]
pub enum StoreError {
    /// The file is shorter than the six byte header
    #[error("header missing: need 6 bytes, file has {actual}")]
    HeaderMissing {
        /// Number of bytes available
        actual: usize,
    },

    /// Magic or marker byte mismatch
    #[error("invalid header: expected 4d4f524945, found {}", hex::encode(.found))]
    HeaderInvalid {
        /// The five preamble bytes that were found
        found: [u8; 5],
    },

    /// The version byte is newer than this build understands
    #[error("unsupported format version {0}")]
    VersionUnsupported(u8),

    /// A record frame could not be decoded
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// A counter edit was not a base-10 u32
    #[error("invalid number for {field}: '{value}'")]
    InvalidNumber {
        /// Field being edited
        field: &'static str,
        /// Rejected input
        value: String,
        /// Parse failure
        #[source]
        source: std::num::ParseIntError,
    },

    /// Edit requested for a field that does not exist
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// Index outside `0..len`
    #[error("index {index} out of bounds for collection of length {len}")]
    OutOfBounds {
        /// Requested index
        index: usize,
        /// Collection length
        len: usize,
    },

    /// Records must have a non-empty name; an empty name is the end sentinel
    #[error("record name must not be empty")]
    EmptyName,

    /// A record refers to bytes outside the collection's backing buffer
    #[error("record view {offset}+{len} lies outside backing buffer of {buffer_len} bytes")]
    DanglingView {
        /// View offset
        offset: usize,
        /// View length
        len: usize,
        /// Backing buffer length
        buffer_len: usize,
    },

    /// A field is too long for its u32 length prefix
    #[error("field of {len} bytes does not fit a u32 length prefix")]
    FieldTooLong {
        /// Field length in bytes
        len: usize,
    },

    /// Binary read/write error
    #[error("binary format error: {0}")]
    BinRead(String),

    /// IO error during load or save
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<binrw::Error> for StoreError {
    fn from(e: binrw::Error) -> Self {
        Self::BinRead(e.to_string())
    }
}

impl StoreError {
    /// Whether an interactive caller should simply prompt again
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidNumber { .. } | Self::UnknownField(_) | Self::OutOfBounds { .. }
        )
    }
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
