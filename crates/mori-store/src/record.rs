//! Record types
//!
//! A [`Record`] stores its name and url as [`Span`]s into the collection's
//! backing buffer. [`RecordRef`] pairs a record with that buffer so the bytes
//! can be read; [`NewRecord`] carries owned input from outside the store.

use crate::buffer::{ByteBuffer, Span, text};

/// Volume used when a new record does not supply one
pub const DEFAULT_VOLUME: u32 = 1;

/// One tracked item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Record {
    /// Name view, non-empty for a valid record
    pub name: Span,
    /// Url view, empty when absent
    pub url: Span,
    /// Chapter progress counter
    pub chapter: u32,
    /// Volume progress counter
    pub volume: u32,
}

impl Record {
    /// Create a record from views that already reference a backing buffer
    pub const fn new(name: Span, url: Span, chapter: u32, volume: u32) -> Self {
        Self {
            name,
            url,
            chapter,
            volume,
        }
    }

    /// Borrow the record together with the buffer it points into
    pub const fn view<'a>(&'a self, buffer: &'a ByteBuffer) -> RecordRef<'a> {
        RecordRef {
            record: self,
            buffer,
        }
    }
}

/// A record resolved against its backing buffer
#[derive(Debug, Clone, Copy)]
pub struct RecordRef<'a> {
    record: &'a Record,
    buffer: &'a ByteBuffer,
}

impl<'a> RecordRef<'a> {
    /// The underlying record
    pub const fn record(&self) -> &'a Record {
        self.record
    }

    /// Stored name bytes, including any zero padding left by edits
    pub fn name_bytes(&self) -> &'a [u8] {
        self.buffer.slice(self.record.name)
    }

    /// Stored url bytes, including any zero padding left by edits
    pub fn url_bytes(&self) -> &'a [u8] {
        self.buffer.slice(self.record.url)
    }

    /// Name text up to the first zero byte
    pub fn name(&self) -> &'a [u8] {
        text(self.name_bytes())
    }

    /// Url text, or `None` when the url is empty or was cleared
    pub fn url(&self) -> Option<&'a [u8]> {
        let url = text(self.url_bytes());
        (!url.is_empty()).then_some(url)
    }

    /// Name as lossy UTF-8 for display
    pub fn name_lossy(&self) -> std::borrow::Cow<'a, str> {
        String::from_utf8_lossy(self.name())
    }

    /// Url as lossy UTF-8 for display
    pub fn url_lossy(&self) -> Option<std::borrow::Cow<'a, str>> {
        self.url().map(String::from_utf8_lossy)
    }

    /// Chapter counter
    pub const fn chapter(&self) -> u32 {
        self.record.chapter
    }

    /// Volume counter
    pub const fn volume(&self) -> u32 {
        self.record.volume
    }

    /// Owned copy of the visible fields
    pub fn to_owned_record(&self) -> NewRecord {
        NewRecord {
            name: self.name().to_vec(),
            url: self.url().map(<[u8]>::to_vec).unwrap_or_default(),
            chapter: self.chapter(),
            volume: Some(self.volume()),
        }
    }
}

/// Owned record input, copied into the backing buffer on insertion
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewRecord {
    /// Name bytes, must not be empty
    pub name: Vec<u8>,
    /// Url bytes, empty when absent
    pub url: Vec<u8>,
    /// Chapter counter
    pub chapter: u32,
    /// Volume counter; [`DEFAULT_VOLUME`] when not supplied
    pub volume: Option<u32>,
}

impl NewRecord {
    /// Create a record input with only a name
    pub fn new(name: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the url
    #[must_use]
    pub fn with_url(mut self, url: impl Into<Vec<u8>>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the chapter counter
    #[must_use]
    pub const fn with_chapter(mut self, chapter: u32) -> Self {
        self.chapter = chapter;
        self
    }

    /// Set the volume counter
    #[must_use]
    pub const fn with_volume(mut self, volume: u32) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Volume after applying the default
    pub fn resolved_volume(&self) -> u32 {
        self.volume.unwrap_or(DEFAULT_VOLUME)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_view_reads_buffer() {
        let mut buffer = ByteBuffer::new();
        let name = buffer.append(b"Vagabond");
        let url = buffer.append(b"https://example.org/vagabond");
        let record = Record::new(name, url, 327, 37);

        let view = record.view(&buffer);
        assert_eq!(view.name(), b"Vagabond");
        assert_eq!(view.url(), Some(&b"https://example.org/vagabond"[..]));
        assert_eq!(view.chapter(), 327);
        assert_eq!(view.volume(), 37);
    }

    #[test]
    fn test_cleared_url_reads_as_absent() {
        let mut buffer = ByteBuffer::new();
        let name = buffer.append(b"Berserk");
        let url = buffer.append(b"https://x");
        buffer.zero(url);
        let record = Record::new(name, url, 0, 1);

        let view = record.view(&buffer);
        assert_eq!(view.url(), None);
        assert_eq!(view.url_bytes().len(), 9);
    }

    #[test]
    fn test_padded_name_text() {
        let mut buffer = ByteBuffer::new();
        let name = buffer.append(b"Monster\0\0\0");
        let record = Record::new(name, Span::EMPTY, 0, 1);

        let view = record.view(&buffer);
        assert_eq!(view.name(), b"Monster");
        assert_eq!(view.name_bytes().len(), 10);
        assert_eq!(view.name_lossy(), "Monster");
    }

    #[test]
    fn test_new_record_builder() {
        let record = NewRecord::new("Blame!")
            .with_url("https://example.org")
            .with_chapter(12);
        assert_eq!(record.resolved_volume(), DEFAULT_VOLUME);

        let record = record.with_volume(4);
        assert_eq!(record.resolved_volume(), 4);
    }

    #[test]
    fn test_to_owned_record() {
        let mut buffer = ByteBuffer::new();
        let name = buffer.append(b"Dorohedoro");
        let record = Record::new(name, Span::EMPTY, 167, 23);

        let owned = record.view(&buffer).to_owned_record();
        assert_eq!(
            owned,
            NewRecord::new("Dorohedoro").with_chapter(167).with_volume(23)
        );
    }
}
