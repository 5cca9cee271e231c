//! Core data model types produced by the reader.
//!
//! A [`Record`] is one logical row of already-unescaped fields; a [`ParsePosition`] locates the
//! reader in the underlying stream.

use std::fmt;

use serde::Serialize;

/// Where the reader currently is in the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParsePosition {
    /// Number of characters consumed so far.
    pub char_position: u64,
    /// Number of encoded bytes consumed so far (only tracked when byte counting is enabled).
    pub byte_position: Option<u64>,
    /// Number of physical input lines seen so far (1-based once any input is consumed).
    pub raw_row: u64,
    /// Number of records emitted so far, or the record being read when reported in an error.
    pub logical_row: u64,
}

impl fmt::Display for ParsePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "raw row {} (record {}, char {}",
            self.raw_row, self.logical_row, self.char_position
        )?;
        if let Some(bytes) = self.byte_position {
            write!(f, ", byte {bytes}")?;
        }
        f.write_str(")")
    }
}

/// One logical row: an ordered sequence of fields.
///
/// Fields are stored back to back in a single string buffer, so a record can be cleared and
/// refilled by [`crate::reader::CsvReader::read_record_into`] without reallocating.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    buffer: String,
    ends: Vec<usize>,
    raw_row: u64,
    logical_row: u64,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    /// True if the record holds no fields.
    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    /// Returns the field at `idx`, if present.
    pub fn get(&self, idx: usize) -> Option<&str> {
        let end = *self.ends.get(idx)?;
        let start = if idx == 0 { 0 } else { self.ends[idx - 1] };
        Some(&self.buffer[start..end])
    }

    /// Iterate fields in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Copy fields into owned strings.
    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(str::to_owned).collect()
    }

    /// Physical line on which this record started.
    pub fn raw_row(&self) -> u64 {
        self.raw_row
    }

    /// 1-based number of this record among emitted records.
    pub fn logical_row(&self) -> u64 {
        self.logical_row
    }

    pub(crate) fn clear(&mut self) {
        self.buffer.clear();
        self.ends.clear();
        self.raw_row = 0;
        self.logical_row = 0;
    }

    pub(crate) fn push_field(&mut self, field: &str) {
        self.buffer.push_str(field);
        self.ends.push(self.buffer.len());
    }

    pub(crate) fn set_rows(&mut self, raw_row: u64, logical_row: u64) {
        self.raw_row = raw_row;
        self.logical_row = logical_row;
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = &'a str;
    type IntoIter = Box<dyn Iterator<Item = &'a str> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl<S: AsRef<str>> PartialEq<[S]> for Record {
    fn eq(&self, other: &[S]) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a == b.as_ref())
    }
}

impl<S: AsRef<str>> PartialEq<Vec<S>> for Record {
    fn eq(&self, other: &Vec<S>) -> bool {
        self == other.as_slice()
    }
}
