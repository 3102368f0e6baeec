//! File preamble validation
//!
//! Every store file starts with six bytes:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0x00   | 4    | Magic `MORI` |
//! | 0x04   | 1    | Marker `0x45` |
//! | 0x05   | 1    | Format version |
//!
//! The header is checked before a single record frame is decoded.

use crate::error::{Result, StoreError};
use binrw::{BinRead, BinWrite, Endian};
use std::io::Cursor;

/// Magic bytes at the start of every store file
pub const MAGIC: [u8; 4] = *b"MORI";

/// Fixed marker byte following the magic
pub const MARKER: u8 = 0x45;

/// Header size in bytes
pub const HEADER_SIZE: usize = 6;

/// On-disk format version.
///
/// Both versions share the same frame layout; they differ only in how the
/// `u32` length prefixes and counters are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FormatVersion {
    /// Host-native integers. Files are not portable between little- and
    /// big-endian machines.
    #[default]
    V0,
    /// Little-endian integers on every host
    V1,
}

impl FormatVersion {
    /// Highest version this build reads and writes
    pub const LATEST: Self = Self::V1;

    /// Parse the version byte from a header
    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(Self::V0),
            1 => Ok(Self::V1),
            v => Err(StoreError::VersionUnsupported(v)),
        }
    }

    /// Version byte written into the header
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::V0 => 0,
            Self::V1 => 1,
        }
    }

    /// Integer byte order used by record frames of this version
    pub const fn endian(self) -> Endian {
        match self {
            Self::V0 => Endian::NATIVE,
            Self::V1 => Endian::Little,
        }
    }
}

impl std::fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.as_byte())
    }
}

/// Store file header
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[br(little)]
#[bw(little)]
pub struct FileHeader {
    /// Magic bytes, always `MORI`
    pub magic: [u8; 4],

    /// Marker byte, always [`MARKER`]
    pub marker: u8,

    /// Format version byte
    pub version: u8,
}

impl FileHeader {
    /// Create a header for the given format version
    pub const fn new(version: FormatVersion) -> Self {
        Self {
            magic: MAGIC,
            marker: MARKER,
            version: version.as_byte(),
        }
    }

    /// Validate magic, marker and version
    pub fn validate(&self) -> Result<FormatVersion> {
        if self.magic != MAGIC || self.marker != MARKER {
            let mut found = [0u8; 5];
            found[..4].copy_from_slice(&self.magic);
            found[4] = self.marker;
            return Err(StoreError::HeaderInvalid { found });
        }

        FormatVersion::from_byte(self.version)
    }

    /// Serialize the header to its six bytes
    pub fn to_bytes(&self) -> Result<[u8; HEADER_SIZE]> {
        let mut buf = [0u8; HEADER_SIZE];
        self.write(&mut Cursor::new(&mut buf[..]))?;
        Ok(buf)
    }
}

/// Check the preamble of a loaded file.
///
/// Returns the validated version and the bytes just past the header.
pub fn validate_header(data: &[u8]) -> Result<(FormatVersion, &[u8])> {
    if data.len() < HEADER_SIZE {
        return Err(StoreError::HeaderMissing { actual: data.len() });
    }

    let header = FileHeader::read(&mut Cursor::new(&data[..HEADER_SIZE]))?;
    let version = header.validate()?;

    Ok((version, &data[HEADER_SIZE..]))
}
