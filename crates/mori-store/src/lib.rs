//! Versioned binary record store for the mori reading tracker.
//!
//! A store file is a six byte header followed by back-to-back record frames:
//!
//! ```text
//! "MORI" 0x45 <version> | frame | frame | ... [ u32 0 | "\n" ]
//! ```
//!
//! Each frame holds a length-prefixed name, a length-prefixed url and two
//! `u32` counters (chapter and volume). A zero name length, a lone newline
//! or the end of the buffer ends the stream.
//!
//! # Architecture
//!
//! - `buffer`: byte arena and the [`Span`] views into it
//! - `header`: preamble validation and format versions
//! - `codec`: frame decoding and encoding
//! - `collection`: ordered records with load, edit, search and save
//!
//! # Example
//!
//! ```no_run
//! use mori_store::{Collection, LoadOptions, NewRecord};
//!
//! # fn main() -> mori_store::Result<()> {
//! let (mut collection, report) = Collection::load("mori-mori", &LoadOptions::default())?;
//! if report.is_partial() {
//!     eprintln!("some records could not be read");
//! }
//!
//! collection.push(&NewRecord::new("Vinland Saga").with_chapter(12))?;
//! for (index, record) in collection.find(b"saga") {
//!     println!("{index}: {}", record.name_lossy());
//! }
//!
//! collection.save("mori-mori")?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod buffer;
pub mod codec;
pub mod collection;
pub mod edit;
pub mod error;
pub mod header;
pub mod record;
pub mod search;

pub use buffer::{ByteBuffer, Span};
pub use codec::{Decoded, TrailingBytePolicy};
pub use collection::{Collection, LoadOptions, LoadReport};
pub use edit::{EditOutcome, Field};
pub use error::{DecodeError, Result, StoreError};
pub use header::{FileHeader, FormatVersion, HEADER_SIZE};
pub use record::{DEFAULT_VOLUME, NewRecord, Record, RecordRef};
pub use search::Search;
