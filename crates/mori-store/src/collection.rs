//! The in-memory collection and its file lifecycle.
//!
//! A [`Collection`] owns one [`ByteBuffer`] holding the loaded file image.
//! Decoded records point into it; records created or grown later append to
//! its end. Saving re-encodes every record into a fresh buffer and writes the
//! file in one call.

use crate::buffer::{ByteBuffer, Span};
use crate::codec::{TrailingBytePolicy, decode_frames, encode_one, encoded_len};
use crate::edit::{EditOutcome, Field};
use crate::error::{DecodeError, Result, StoreError};
use crate::header::{FileHeader, FormatVersion, HEADER_SIZE, validate_header};
use crate::record::{NewRecord, Record, RecordRef};
use crate::search::Search;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Options controlling how a file is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadOptions {
    /// Treatment of a single stray byte after the last frame
    pub trailing_policy: TrailingBytePolicy,
    /// Version written when the file does not exist yet
    pub bootstrap_version: FormatVersion,
}

impl LoadOptions {
    /// Set the trailing byte policy
    #[must_use]
    pub const fn with_trailing_policy(mut self, policy: TrailingBytePolicy) -> Self {
        self.trailing_policy = policy;
        self
    }

    /// Set the version used for newly created files
    #[must_use]
    pub const fn with_bootstrap_version(mut self, version: FormatVersion) -> Self {
        self.bootstrap_version = version;
        self
    }
}

/// Summary of a load
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadReport {
    /// The file did not exist and a header-only file was written
    pub created: bool,
    /// Bytes read from disk
    pub bytes_read: usize,
    /// Records kept
    pub records_loaded: usize,
    /// Decode error that cut loading short, if any
    pub decode_error: Option<DecodeError>,
}

impl LoadReport {
    /// Whether some of the file could not be decoded
    pub const fn is_partial(&self) -> bool {
        self.decode_error.is_some()
    }
}

/// Ordered records plus the buffer their views point into
#[derive(Debug, Clone, Default)]
pub struct Collection {
    buffer: ByteBuffer,
    records: Vec<Record>,
    version: FormatVersion,
}

impl Collection {
    /// Create an empty version 0 collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collection that saves as `version`
    pub fn with_version(version: FormatVersion) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    /// Decode a complete file image.
    ///
    /// Header problems are errors. A frame that fails to decode stops loading
    /// and is reported; the records before it are kept.
    pub fn from_bytes(data: Vec<u8>, options: &LoadOptions) -> Result<(Self, LoadReport)> {
        let (version, _) = validate_header(&data)?;

        let (records, decode_error) =
            decode_frames(&data, HEADER_SIZE, version, options.trailing_policy);

        if let Some(e) = &decode_error {
            warn!(
                "Stopped loading after {} records: {}",
                records.len(),
                e
            );
        }

        let report = LoadReport {
            created: false,
            bytes_read: data.len(),
            records_loaded: records.len(),
            decode_error,
        };

        Ok((
            Self {
                buffer: ByteBuffer::from(data),
                records,
                version,
            },
            report,
        ))
    }

    /// Load the collection stored at `path`.
    ///
    /// A missing file is created holding only a header and yields an empty
    /// collection. An existing file that fails header validation is left
    /// untouched and the error is returned.
    pub fn load(path: impl AsRef<Path>, options: &LoadOptions) -> Result<(Self, LoadReport)> {
        let path = path.as_ref();
        debug!("Checking for store file '{}'", path.display());

        if !path.try_exists()? {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }
            let header = FileHeader::new(options.bootstrap_version).to_bytes()?;
            fs::write(path, header)?;
            info!(
                "Created store file '{}' ({})",
                path.display(),
                options.bootstrap_version
            );
            let report = LoadReport {
                created: true,
                ..LoadReport::default()
            };
            return Ok((Self::with_version(options.bootstrap_version), report));
        }

        let data = fs::read(path)?;
        info!("Read {} bytes from '{}'", data.len(), path.display());
        let (collection, report) = Self::from_bytes(data, options)?;
        info!(
            "Loaded {} records ({})",
            report.records_loaded, collection.version
        );
        Ok((collection, report))
    }

    /// Format version used when saving
    pub const fn version(&self) -> FormatVersion {
        self.version
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The backing buffer
    pub const fn buffer(&self) -> &ByteBuffer {
        &self.buffer
    }

    /// Iterate over all records in order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = RecordRef<'_>> + '_ {
        self.records.iter().map(|record| record.view(&self.buffer))
    }

    /// Borrow the record at `index`
    pub fn get(&self, index: usize) -> Result<RecordRef<'_>> {
        self.records
            .get(index)
            .map(|record| record.view(&self.buffer))
            .ok_or(StoreError::OutOfBounds {
                index,
                len: self.records.len(),
            })
    }

    /// Copy external bytes into the backing buffer
    pub fn intern(&mut self, bytes: &[u8]) -> Span {
        self.buffer.append(bytes)
    }

    /// Append a record whose views already point into this collection.
    ///
    /// Returns the index of the new record.
    pub fn append(&mut self, record: Record) -> Result<usize> {
        if record.name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        for span in [record.name, record.url] {
            if !self.buffer.contains(span) {
                return Err(StoreError::DanglingView {
                    offset: span.offset(),
                    len: span.len(),
                    buffer_len: self.buffer.len(),
                });
            }
        }

        self.records.push(record);
        Ok(self.records.len() - 1)
    }

    /// Copy `new` into the buffer and append it.
    ///
    /// Returns the index of the new record.
    pub fn push(&mut self, new: &NewRecord) -> Result<usize> {
        if new.name.is_empty() {
            return Err(StoreError::EmptyName);
        }

        let name = self.intern(&new.name);
        let url = if new.url.is_empty() {
            Span::EMPTY
        } else {
            self.intern(&new.url)
        };

        self.append(Record::new(name, url, new.chapter, new.resolved_volume()))
    }

    /// Remove the record at `index`, shifting later records down.
    ///
    /// An out-of-range index is logged and ignored.
    pub fn remove_at(&mut self, index: usize) -> Option<Record> {
        if index >= self.records.len() {
            warn!(
                "Ignoring removal of index {} from collection of length {}",
                index,
                self.records.len()
            );
            return None;
        }
        Some(self.records.remove(index))
    }

    /// Records whose name contains `term`, ignoring ASCII case
    pub fn find<'a>(&'a self, term: &'a [u8]) -> Search<'a> {
        self.find_with(term, true)
    }

    /// Records whose name contains `term`
    pub fn find_with<'a>(&'a self, term: &'a [u8], case_insensitive: bool) -> Search<'a> {
        Search::new(&self.records, &self.buffer, term, case_insensitive)
    }

    /// Edit a field by name, parsing `value` as the field requires.
    ///
    /// `field` accepts the spellings understood by [`Field`]. Text fields take
    /// `value` verbatim; counters are parsed as base-10 `u32` after trimming.
    pub fn edit_field(&mut self, index: usize, field: &str, value: &str) -> Result<EditOutcome> {
        self.check_index(index)?;
        let field: Field = field.parse()?;
        self.edit(index, field, value)
    }

    /// Edit a typed field
    pub fn edit(&mut self, index: usize, field: Field, value: &str) -> Result<EditOutcome> {
        match field {
            Field::Name => self.set_name(index, value.as_bytes()),
            Field::Url => self.set_url(index, value.as_bytes()),
            Field::Chapter | Field::Volume => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    self.check_index(index)?;
                    return Ok(EditOutcome::Unchanged);
                }
                let number = trimmed
                    .parse::<u32>()
                    .map_err(|source| StoreError::InvalidNumber {
                        field: field.as_str(),
                        value: trimmed.to_string(),
                        source,
                    })?;
                if field == Field::Chapter {
                    self.set_chapter(index, number)
                } else {
                    self.set_volume(index, number)
                }
            }
        }
    }

    /// Replace the name. An empty value leaves the name unchanged.
    pub fn set_name(&mut self, index: usize, value: &[u8]) -> Result<EditOutcome> {
        self.check_index(index)?;
        if value.is_empty() {
            return Ok(EditOutcome::Unchanged);
        }
        let current = self.records[index].name;
        let updated = self.buffer.overwrite(current, value);
        self.records[index].name = updated;
        Ok(if updated == current {
            EditOutcome::InPlace
        } else {
            EditOutcome::Grown
        })
    }

    /// Replace the url. An empty value clears the url.
    pub fn set_url(&mut self, index: usize, value: &[u8]) -> Result<EditOutcome> {
        self.check_index(index)?;
        let current = self.records[index].url;
        if value.is_empty() {
            if current.is_empty() {
                return Ok(EditOutcome::Unchanged);
            }
            self.buffer.zero(current);
            return Ok(EditOutcome::Cleared);
        }
        let updated = self.buffer.overwrite(current, value);
        self.records[index].url = updated;
        Ok(if updated == current {
            EditOutcome::InPlace
        } else {
            EditOutcome::Grown
        })
    }

    /// Replace the chapter counter
    pub fn set_chapter(&mut self, index: usize, chapter: u32) -> Result<EditOutcome> {
        self.check_index(index)?;
        self.records[index].chapter = chapter;
        Ok(EditOutcome::Set)
    }

    /// Replace the volume counter
    pub fn set_volume(&mut self, index: usize, volume: u32) -> Result<EditOutcome> {
        self.check_index(index)?;
        self.records[index].volume = volume;
        Ok(EditOutcome::Set)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.records.len() {
            Ok(())
        } else {
            Err(StoreError::OutOfBounds {
                index,
                len: self.records.len(),
            })
        }
    }

    /// Encode the header and every record into a fresh buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let size = HEADER_SIZE + self.iter().map(|r| encoded_len(&r)).sum::<usize>();
        let mut out = Vec::with_capacity(size);
        out.extend_from_slice(&FileHeader::new(self.version).to_bytes()?);
        for record in self.iter() {
            encode_one(&record, self.version, &mut out)?;
        }
        Ok(out)
    }

    /// Overwrite `path` with the encoded collection in a single write
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = self.to_bytes()?;
        fs::write(path, &data)?;
        info!(
            "Saved {} records ({} bytes) to '{}'",
            self.records.len(),
            data.len(),
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Collection {
        let mut collection = Collection::new();
        for name in ["a", "b", "c", "d"] {
            collection.push(&NewRecord::new(name)).expect("push");
        }
        collection
    }

    fn names(collection: &Collection) -> Vec<String> {
        collection
            .iter()
            .map(|r| r.name_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_push_applies_default_volume() {
        let mut collection = Collection::new();
        let index = collection
            .push(&NewRecord::new("Pluto").with_chapter(65))
            .expect("push");
        let record = collection.get(index).expect("get");
        assert_eq!(record.volume(), 1);
        assert_eq!(record.chapter(), 65);
        assert_eq!(record.url(), None);
    }

    #[test]
    fn test_push_rejects_empty_name() {
        let mut collection = Collection::new();
        assert!(matches!(
            collection.push(&NewRecord::new("")),
            Err(StoreError::EmptyName)
        ));
        assert!(collection.buffer().is_empty());
    }

    #[test]
    fn test_append_requires_interned_views() {
        let mut collection = Collection::new();
        let name = collection.intern(b"Kingdom");
        assert_eq!(collection.append(Record::new(name, Span::EMPTY, 1, 1)).unwrap(), 0);

        let stray = Record::new(Span::new(100, 4), Span::EMPTY, 1, 1);
        assert!(matches!(
            collection.append(stray),
            Err(StoreError::DanglingView { offset: 100, .. })
        ));
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut collection = sample();
        let removed = collection.remove_at(1).expect("in range");
        assert_eq!(collection.buffer().slice(removed.name), b"b");
        assert_eq!(names(&collection), ["a", "c", "d"]);
    }

    #[test]
    fn test_remove_out_of_range_is_noop() {
        let mut collection = sample();
        assert!(collection.remove_at(4).is_none());
        assert_eq!(names(&collection), ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_get_out_of_bounds() {
        let collection = sample();
        assert!(matches!(
            collection.get(9),
            Err(StoreError::OutOfBounds { index: 9, len: 4 })
        ));
    }

    #[test]
    fn test_edit_name_in_place() {
        let mut collection = Collection::new();
        collection.push(&NewRecord::new("Naruto")).unwrap();
        let buffer_len = collection.buffer().len();

        let outcome = collection.edit_field(0, "name", "Nana").unwrap();
        assert_eq!(outcome, EditOutcome::InPlace);
        assert_eq!(collection.buffer().len(), buffer_len);

        let record = collection.get(0).unwrap();
        assert_eq!(record.name_bytes(), b"Nana\0\0");
        assert_eq!(record.name(), b"Nana");
    }

    #[test]
    fn test_edit_name_grows() {
        let mut collection = Collection::new();
        collection.push(&NewRecord::new("Nana")).unwrap();
        let old = collection.get(0).unwrap().record().name;

        let outcome = collection.edit_field(0, "NAME", "Nana to Kaoru").unwrap();
        assert_eq!(outcome, EditOutcome::Grown);

        let record = collection.get(0).unwrap();
        assert_eq!(record.name(), b"Nana to Kaoru");
        assert_ne!(record.record().name, old);
        // The original bytes are left behind
        assert_eq!(collection.buffer().slice(old), b"Nana");
    }

    #[test]
    fn test_empty_name_edit_is_ignored() {
        let mut collection = Collection::new();
        collection.push(&NewRecord::new("Nana")).unwrap();
        assert_eq!(
            collection.edit_field(0, "name", "").unwrap(),
            EditOutcome::Unchanged
        );
        assert_eq!(collection.get(0).unwrap().name(), b"Nana");
    }

    #[test]
    fn test_edit_url_clear_and_set() {
        let mut collection = Collection::new();
        collection.push(&NewRecord::new("Nana")).unwrap();

        assert_eq!(
            collection.edit_field(0, "url", "").unwrap(),
            EditOutcome::Unchanged
        );
        assert_eq!(
            collection.edit_field(0, "url", "https://a").unwrap(),
            EditOutcome::Grown
        );
        assert_eq!(
            collection.edit_field(0, "url", "https://b").unwrap(),
            EditOutcome::InPlace
        );
        assert_eq!(collection.get(0).unwrap().url(), Some(&b"https://b"[..]));

        assert_eq!(
            collection.edit_field(0, "url", "").unwrap(),
            EditOutcome::Cleared
        );
        let record = collection.get(0).unwrap();
        assert_eq!(record.url(), None);
        assert_eq!(record.url_bytes(), &[0u8; 9]);
    }

    #[test]
    fn test_edit_counters() {
        let mut collection = Collection::new();
        collection.push(&NewRecord::new("Nana")).unwrap();

        assert_eq!(
            collection.edit_field(0, "chapters", " 84 ").unwrap(),
            EditOutcome::Set
        );
        assert_eq!(
            collection.edit_field(0, "volume", "21").unwrap(),
            EditOutcome::Set
        );
        assert_eq!(
            collection.edit_field(0, "volume", "  ").unwrap(),
            EditOutcome::Unchanged
        );

        let record = collection.get(0).unwrap();
        assert_eq!(record.chapter(), 84);
        assert_eq!(record.volume(), 21);
    }

    #[test]
    fn test_invalid_number_leaves_field() {
        let mut collection = Collection::new();
        collection
            .push(&NewRecord::new("Nana").with_chapter(3))
            .unwrap();

        for bad in ["abc", "-1", "4294967296", "1.5"] {
            let err = collection.edit_field(0, "chapter", bad).expect_err(bad);
            assert!(matches!(
                err,
                StoreError::InvalidNumber { field: "chapter", .. }
            ));
        }
        assert_eq!(collection.get(0).unwrap().chapter(), 3);
    }

    #[test]
    fn test_unknown_field_and_bad_index() {
        let mut collection = sample();
        assert!(matches!(
            collection.edit_field(0, "rating", "5"),
            Err(StoreError::UnknownField(_))
        ));
        assert!(matches!(
            collection.edit_field(10, "name", "x"),
            Err(StoreError::OutOfBounds { index: 10, .. })
        ));
    }

    #[test]
    fn test_find_in_order() {
        let mut collection = Collection::new();
        for name in ["Naruto Shippuden", "Bleach", "naruto", "Boruto"] {
            collection.push(&NewRecord::new(name)).unwrap();
        }

        let hits: Vec<usize> = collection.find(b"NARUTO").map(|(i, _)| i).collect();
        assert_eq!(hits, [0, 2]);

        let hits: Vec<usize> = collection
            .find_with(b"naruto", false)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(hits, [2]);

        let hits: Vec<usize> = collection.find(b"uto").map(|(i, _)| i).collect();
        assert_eq!(hits, [0, 2, 3]);
    }

    #[test]
    fn test_find_uses_text_not_padding() {
        let mut collection = Collection::new();
        collection.push(&NewRecord::new("Naruto")).unwrap();
        collection.edit_field(0, "name", "Nar").unwrap();

        assert_eq!(collection.find(b"nar").count(), 1);
        assert_eq!(collection.find(b"naruto").count(), 0);
    }

    #[test]
    fn test_to_bytes_round_trip() {
        let mut collection = Collection::with_version(FormatVersion::V1);
        collection
            .push(
                &NewRecord::new("Vinland Saga")
                    .with_url("https://example.org/vinland")
                    .with_chapter(200)
                    .with_volume(27),
            )
            .unwrap();
        collection.push(&NewRecord::new("Planetes")).unwrap();

        let data = collection.to_bytes().unwrap();
        assert_eq!(&data[..HEADER_SIZE], b"MORI\x45\x01");

        let (loaded, report) = Collection::from_bytes(data, &LoadOptions::default()).unwrap();
        assert!(!report.is_partial());
        assert_eq!(report.records_loaded, 2);
        assert_eq!(loaded.version(), FormatVersion::V1);

        let before: Vec<NewRecord> = collection.iter().map(|r| r.to_owned_record()).collect();
        let after: Vec<NewRecord> = loaded.iter().map(|r| r.to_owned_record()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_loaded_records_alias_file_image() {
        let collection = sample();
        let data = collection.to_bytes().unwrap();
        let (loaded, _) = Collection::from_bytes(data.clone(), &LoadOptions::default()).unwrap();

        assert_eq!(loaded.buffer().as_slice(), data.as_slice());
        let first = loaded.get(0).unwrap().record().name;
        assert_eq!(first.offset(), HEADER_SIZE + 4);
    }
}
