//! Record frame codec
//!
//! A frame is laid out as:
//!
//! ```text
//! u32 name_len | name_len bytes | u32 url_len | url_len bytes | u32 chapter | u32 volume
//! ```
//!
//! Integers use the byte order of the file's [`FormatVersion`]. Decoding
//! yields [`Record`]s whose spans point straight into the decoded buffer; no
//! bytes are copied.

use crate::buffer::Span;
use crate::error::{DecodeError, Result, StoreError};
use crate::header::FormatVersion;
use crate::record::{Record, RecordRef};
use binrw::Endian;
use tracing::{debug, warn};

/// Size of a frame's fixed-width fields (two length prefixes, two counters)
pub const FRAME_OVERHEAD: usize = 16;

/// How a single leftover non-newline byte after the last frame is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingBytePolicy {
    /// Log a warning and stop decoding
    #[default]
    Lenient,
    /// Fail with [`DecodeError::StrayTrailingByte`]
    Strict,
}

/// Outcome of decoding at one offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// A complete frame
    Record {
        /// The decoded record, spans relative to the decoded buffer
        record: Record,
        /// Bytes consumed by the frame
        consumed: usize,
    },
    /// Normal end of the record stream
    EndOfStream,
}

struct FrameReader<'a> {
    buffer: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl FrameReader<'_> {
    fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.pos)
    }

    fn read_u32(&mut self) -> Option<u32> {
        let bytes: [u8; 4] = self
            .buffer
            .get(self.pos..self.pos.checked_add(4)?)?
            .try_into()
            .ok()?;
        self.pos += 4;
        Some(match self.endian {
            Endian::Big => u32::from_be_bytes(bytes),
            Endian::Little => u32::from_le_bytes(bytes),
        })
    }

    fn take(&mut self, len: usize) -> Option<Span> {
        if len > self.remaining() {
            return None;
        }
        let span = Span::new(self.pos, len);
        self.pos += len;
        Some(span)
    }
}

/// Decode one frame starting at `offset`.
pub fn decode_one(
    buffer: &[u8],
    offset: usize,
    version: FormatVersion,
    policy: TrailingBytePolicy,
) -> std::result::Result<Decoded, DecodeError> {
    match buffer.get(offset..).unwrap_or_default() {
        [] => return Ok(Decoded::EndOfStream),
        [b'\n'] => {
            debug!("Ignoring trailing newline at offset {}", offset);
            return Ok(Decoded::EndOfStream);
        }
        [byte] => match policy {
            TrailingBytePolicy::Lenient => {
                warn!(
                    "Ignoring stray trailing byte {:#04x} at offset {}",
                    byte, offset
                );
                return Ok(Decoded::EndOfStream);
            }
            TrailingBytePolicy::Strict => {
                return Err(DecodeError::StrayTrailingByte {
                    offset,
                    byte: *byte,
                });
            }
        },
        _ => {}
    }

    let mut reader = FrameReader {
        buffer,
        pos: offset,
        endian: version.endian(),
    };

    let name_len = reader
        .read_u32()
        .ok_or(DecodeError::TruncatedNameLength { offset: reader.pos })? as usize;
    if name_len == 0 {
        return Ok(Decoded::EndOfStream);
    }
    let name = reader.take(name_len).ok_or(DecodeError::TruncatedName {
        offset: reader.pos,
        expected: name_len,
        available: reader.remaining(),
    })?;

    let url_len = reader
        .read_u32()
        .ok_or(DecodeError::TruncatedUrlLength { offset: reader.pos })? as usize;
    let url = reader.take(url_len).ok_or(DecodeError::TruncatedUrl {
        offset: reader.pos,
        expected: url_len,
        available: reader.remaining(),
    })?;

    let chapter = reader
        .read_u32()
        .ok_or(DecodeError::TruncatedChapter { offset: reader.pos })?;
    let volume = reader
        .read_u32()
        .ok_or(DecodeError::TruncatedVolume { offset: reader.pos })?;

    Ok(Decoded::Record {
        record: Record::new(name, url, chapter, volume),
        consumed: reader.pos - offset,
    })
}

/// Decode frames from `offset` until the end of the stream.
///
/// Decoding stops at the first error; every record decoded before it is
/// returned alongside the error.
pub fn decode_frames(
    buffer: &[u8],
    offset: usize,
    version: FormatVersion,
    policy: TrailingBytePolicy,
) -> (Vec<Record>, Option<DecodeError>) {
    let mut records = Vec::new();
    let mut pos = offset;

    loop {
        match decode_one(buffer, pos, version, policy) {
            Ok(Decoded::Record { record, consumed }) => {
                debug!(
                    "Decoded record '{}' (chapter {}, volume {})",
                    String::from_utf8_lossy(&buffer[record.name.range()]),
                    record.chapter,
                    record.volume
                );
                records.push(record);
                pos += consumed;
            }
            Ok(Decoded::EndOfStream) => return (records, None),
            Err(e) => return (records, Some(e)),
        }
    }
}

fn write_u32(out: &mut Vec<u8>, value: u32, endian: Endian) {
    let bytes = match endian {
        Endian::Big => value.to_be_bytes(),
        Endian::Little => value.to_le_bytes(),
    };
    out.extend_from_slice(&bytes);
}

fn write_field(out: &mut Vec<u8>, bytes: &[u8], endian: Endian) -> Result<()> {
    let len = u32::try_from(bytes.len())
        .map_err(|_| StoreError::FieldTooLong { len: bytes.len() })?;
    write_u32(out, len, endian);
    out.extend_from_slice(bytes);
    Ok(())
}

/// Append the frame for `record` to `out`.
///
/// Fields are written with their full stored length, zero padding included.
pub fn encode_one(record: &RecordRef<'_>, version: FormatVersion, out: &mut Vec<u8>) -> Result<()> {
    let endian = version.endian();
    write_field(out, record.name_bytes(), endian)?;
    write_field(out, record.url_bytes(), endian)?;
    write_u32(out, record.chapter(), endian);
    write_u32(out, record.volume(), endian);
    Ok(())
}

/// Encoded size of a frame for `record`
pub fn encoded_len(record: &RecordRef<'_>) -> usize {
    FRAME_OVERHEAD + record.name_bytes().len() + record.url_bytes().len()
}
