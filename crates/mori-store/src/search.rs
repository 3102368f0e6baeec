//! Substring search over record names

use crate::buffer::ByteBuffer;
use crate::record::{Record, RecordRef};
use std::iter::Enumerate;
use std::slice::Iter;

/// Whether `needle` occurs as a contiguous run of bytes in `haystack`.
///
/// With `case_insensitive` set, ASCII letters are folded before comparing;
/// every other byte must match exactly.
pub fn contains_bytes(haystack: &[u8], needle: &[u8], case_insensitive: bool) -> bool {
    if needle.is_empty() {
        return true;
    }
    if needle.len() > haystack.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|window| {
        if case_insensitive {
            window.eq_ignore_ascii_case(needle)
        } else {
            window == needle
        }
    })
}

/// Lazy iterator over `(index, record)` pairs whose name matches a term.
///
/// Yields in collection order. It borrows the collection, so it cannot
/// outlive an edit, and it is consumed as it goes.
#[derive(Debug)]
pub struct Search<'a> {
    records: Enumerate<Iter<'a, Record>>,
    buffer: &'a ByteBuffer,
    needle: &'a [u8],
    case_insensitive: bool,
}

impl<'a> Search<'a> {
    pub(crate) fn new(
        records: &'a [Record],
        buffer: &'a ByteBuffer,
        needle: &'a [u8],
        case_insensitive: bool,
    ) -> Self {
        Self {
            records: records.iter().enumerate(),
            buffer,
            needle,
            case_insensitive,
        }
    }
}

impl<'a> Iterator for Search<'a> {
    type Item = (usize, RecordRef<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let buffer = self.buffer;
        let needle = self.needle;
        let case_insensitive = self.case_insensitive;
        self.records.find_map(|(index, record)| {
            let view = record.view(buffer);
            contains_bytes(view.name(), needle, case_insensitive).then_some((index, view))
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.records.size_hint().1)
    }
}
