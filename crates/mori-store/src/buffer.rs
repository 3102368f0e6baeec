//! Growable byte arena backing every record view.
//!
//! Record names and urls never own their bytes. They are [`Span`]s, an
//! `(offset, len)` pair into the single [`ByteBuffer`] owned by a collection.
//! Spans are plain indices, so the buffer may reallocate on growth without
//! invalidating any outstanding view.

use std::ops::Range;

/// A view into a [`ByteBuffer`] expressed as offset and length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    offset: usize,
    len: usize,
}

impl Span {
    /// The zero-length span, used for an absent url
    pub const EMPTY: Self = Self { offset: 0, len: 0 };

    /// Create a span from raw parts
    pub const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Start offset in the backing buffer
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Length in bytes
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the span covers no bytes
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last byte covered
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }

    /// The span as a byte range
    pub const fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }
}

/// Growable byte sequence used as file staging area and record arena
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteBuffer {
    data: Vec<u8>,
}

impl ByteBuffer {
    /// Create an empty buffer
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Create an empty buffer with reserved capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes stored
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no bytes
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whole buffer contents
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer and return its bytes
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Whether `span` lies entirely inside the buffer
    pub fn contains(&self, span: Span) -> bool {
        span.offset <= self.data.len() && span.len <= self.data.len() - span.offset
    }

    /// Bytes covered by `span`, or `None` when it points outside the buffer
    pub fn get(&self, span: Span) -> Option<&[u8]> {
        self.data.get(span.range())
    }

    /// Bytes covered by `span`; an out-of-range span reads as empty
    pub fn slice(&self, span: Span) -> &[u8] {
        self.get(span).unwrap_or_default()
    }

    /// Append bytes at the end and return the span covering them
    pub fn append(&mut self, bytes: &[u8]) -> Span {
        let offset = self.data.len();
        self.data.extend_from_slice(bytes);
        Span::new(offset, bytes.len())
    }

    /// Replace the contents of `span` with `bytes`, or move it to the end.
    ///
    /// When `bytes` fits in the span it is written in place and the remainder
    /// is zero-filled; the returned span is unchanged. Otherwise the bytes are
    /// appended and the returned span points at the new copy. The old bytes are
    /// not reclaimed.
    pub fn overwrite(&mut self, span: Span, bytes: &[u8]) -> Span {
        if bytes.len() <= span.len
            && let Some(target) = self.data.get_mut(span.range())
        {
            let (head, tail) = target.split_at_mut(bytes.len());
            head.copy_from_slice(bytes);
            tail.fill(0);
            return span;
        }
        self.append(bytes)
    }

    /// Zero-fill the bytes covered by `span`
    pub fn zero(&mut self, span: Span) {
        if let Some(target) = self.data.get_mut(span.range()) {
            target.fill(0);
        }
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl AsRef<[u8]> for ByteBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

/// Bytes of a view up to its first zero byte.
///
/// In-place edits pad shortened fields with zeros; everything that shows or
/// matches text works on this trimmed form.
pub fn text(bytes: &[u8]) -> &[u8] {
    bytes
        .iter()
        .position(|&b| b == 0)
        .map_or(bytes, |end| &bytes[..end])
}
