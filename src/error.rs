use std::fmt;

use thiserror::Error;

use crate::types::ParsePosition;

/// Convenience result type for reader operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Error type returned by configuration and reader functions.
///
/// This is a single error enum shared by construction, tokenizing and validation.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Invalid settings rejected when building a [`crate::config::Configuration`].
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// A record violated a strict validation rule (width drift or bad data).
    #[error("malformed record at {position}: {kind}")]
    MalformedRecord {
        kind: MalformedKind,
        position: ParsePosition,
        /// Raw text of the offending record consumed up to the point of failure.
        raw_record: String,
    },

    /// Underlying I/O or decoding failure.
    #[error("stream error: {0}")]
    Stream(#[from] std::io::Error),

    /// The reader was used after [`crate::reader::CsvReader::close`].
    #[error("reader used after close")]
    Disposed,
}

impl CsvError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// What made a record malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedKind {
    /// Field count differs from the baseline set by the first record.
    WidthDrift { expected: usize, actual: usize },
    /// A field was marked bad while strict bad-data handling is enabled.
    BadData { reason: BadDataReason, field: String },
}

impl fmt::Display for MalformedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WidthDrift { expected, actual } => {
                write!(f, "expected {expected} fields, found {actual}")
            }
            Self::BadData { reason, field } => write!(f, "{reason} (raw='{field}')"),
        }
    }
}

/// Why a field was marked bad during accumulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadDataReason {
    /// Characters followed the closing quote of a quoted field.
    TrailingAfterQuote,
    /// The stream ended inside a quoted field.
    UnterminatedQuote,
    /// A quoted field contained a line break while that is configured as bad data.
    LineBreakInQuotedField,
}

impl fmt::Display for BadDataReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::TrailingAfterQuote => "unexpected data after closing quote",
            Self::UnterminatedQuote => "stream ended inside a quoted field",
            Self::LineBreakInQuotedField => "line break inside quoted field",
        };
        f.write_str(msg)
    }
}
