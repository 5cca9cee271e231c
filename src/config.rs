//! Reader configuration.
//!
//! [`CsvSettings`] is plain data (serde-friendly, so a key-value loader can produce it).
//! [`Configuration`] is the validated, immutable bundle a [`crate::reader::CsvReader`] reads
//! from; it also carries the optional bad-data callback and observer.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{BadDataReason, CsvError, CsvResult};
use crate::observability::{ParseObserver, ParseSeverity};
use crate::types::ParsePosition;

/// Default number of bytes requested from the stream per refill.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Largest accepted `buffer_size` (16 MiB).
pub const MAX_BUFFER_SIZE: usize = 16 * 1024 * 1024;

/// Character encoding of the input stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// UTF-8 (a leading byte-order mark is skipped).
    #[default]
    Utf8,
    /// ISO-8859-1: every byte is one char.
    Latin1,
}

impl Encoding {
    /// Number of encoded bytes `c` occupies in this encoding.
    pub fn encoded_len(self, c: char) -> usize {
        match self {
            Self::Utf8 => c.len_utf8(),
            Self::Latin1 => 1,
        }
    }
}

/// Raw reader settings.
///
/// Use [`Default`] for comma-separated, double-quoted input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvSettings {
    /// Field separator; may be longer than one char.
    pub delimiter: String,
    /// Quote char opening and closing quoted fields.
    pub quote: char,
    /// Escape char used inside quoted fields. Equal to `quote` means quote doubling.
    pub escape: char,
    /// Comment marker honored when `allow_comments` is set.
    pub comment: char,
    /// Discard lines that start with `comment`.
    pub allow_comments: bool,
    /// Treat quote chars as ordinary data.
    pub ignore_quotes: bool,
    /// Trim spaces/tabs around fields (outside quotes for quoted fields).
    pub trim_fields: bool,
    /// Trim spaces/tabs inside quoted fields.
    pub trim_inside_quotes: bool,
    /// Drop empty lines instead of returning a one-field record.
    pub skip_blank_lines: bool,
    /// Fail records whose field count differs from the first record.
    pub detect_width_drift: bool,
    /// With width-drift detection, fail as soon as a record grows past the baseline instead
    /// of waiting for the record to end.
    pub incremental_width_check: bool,
    /// Unwrap `="<digits>"` fields to `<digits>`.
    pub excel_leading_zero_format: bool,
    /// Turn bad fields into [`CsvError::MalformedRecord`] instead of tolerating them.
    pub strict_bad_data: bool,
    /// Mark quoted fields that contain a line break as bad.
    pub line_break_in_quoted_field_is_bad_data: bool,
    /// Character encoding of the input bytes.
    pub encoding: Encoding,
    /// Bytes requested from the stream per refill, at most [`MAX_BUFFER_SIZE`].
    pub buffer_size: usize,
    /// Track [`ParsePosition::byte_position`].
    pub count_bytes: bool,
}

impl Default for CsvSettings {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            quote: '"',
            escape: '"',
            comment: '#',
            allow_comments: false,
            ignore_quotes: false,
            trim_fields: false,
            trim_inside_quotes: false,
            skip_blank_lines: true,
            detect_width_drift: false,
            incremental_width_check: true,
            excel_leading_zero_format: false,
            strict_bad_data: false,
            line_break_in_quoted_field_is_bad_data: false,
            encoding: Encoding::Utf8,
            buffer_size: DEFAULT_BUFFER_SIZE,
            count_bytes: false,
        }
    }
}

/// Details handed to the bad-data callback and observers.
#[derive(Debug, Clone, Copy)]
pub struct BadDataContext<'a> {
    pub reason: BadDataReason,
    /// Raw text of the offending field as read from the stream (quotes included).
    pub field: &'a str,
    /// Raw text of the record consumed so far.
    pub raw_record: &'a str,
    pub position: ParsePosition,
}

/// Caller hook invoked synchronously when a bad field completes in lenient mode.
pub type BadDataCallback = Arc<dyn Fn(&BadDataContext<'_>) + Send + Sync>;

/// Validated, immutable reader configuration.
///
/// Build once and share: [`crate::reader::CsvReader::new`] accepts anything convertible into
/// `Arc<Configuration>`.
#[derive(Clone)]
pub struct Configuration {
    settings: CsvSettings,
    delimiter: Vec<char>,
    bad_data_found: Option<BadDataCallback>,
    observer: Option<Arc<dyn ParseObserver>>,
    alert_at_or_above: ParseSeverity,
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("settings", &self.settings)
            .field("bad_data_callback_set", &self.bad_data_found.is_some())
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Configuration {
    /// Validate `settings` and build a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CsvError::Configuration`] for an empty delimiter, a delimiter containing a
    /// line break or the quote char, line-break quote/escape chars, a comment char clashing with
    /// the delimiter or quote, a zero buffer size, or Excel leading-zero handling combined with
    /// `ignore_quotes`.
    pub fn new(settings: CsvSettings) -> CsvResult<Self> {
        validate(&settings)?;
        Ok(Self {
            delimiter: settings.delimiter.chars().collect(),
            settings,
            bad_data_found: None,
            observer: None,
            alert_at_or_above: ParseSeverity::Critical,
        })
    }

    /// Comma-separated defaults.
    pub fn comma() -> Self {
        Self {
            delimiter: vec![','],
            settings: CsvSettings::default(),
            bad_data_found: None,
            observer: None,
            alert_at_or_above: ParseSeverity::Critical,
        }
    }

    /// Attach the lenient-mode bad-data callback.
    pub fn with_bad_data_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&BadDataContext<'_>) + Send + Sync + 'static,
    {
        self.bad_data_found = Some(Arc::new(callback));
        self
    }

    /// Attach an observer for record, bad-data and failure events.
    pub fn with_observer(mut self, observer: Arc<dyn ParseObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Severity threshold at which [`ParseObserver::on_alert`] is invoked.
    pub fn with_alert_threshold(mut self, severity: ParseSeverity) -> Self {
        self.alert_at_or_above = severity;
        self
    }

    pub fn settings(&self) -> &CsvSettings {
        &self.settings
    }

    /// Delimiter split into chars.
    pub(crate) fn delimiter_chars(&self) -> &[char] {
        &self.delimiter
    }

    pub(crate) fn bad_data_callback(&self) -> Option<&BadDataCallback> {
        self.bad_data_found.as_ref()
    }

    pub(crate) fn observer(&self) -> Option<&Arc<dyn ParseObserver>> {
        self.observer.as_ref()
    }

    pub(crate) fn alert_at_or_above(&self) -> ParseSeverity {
        self.alert_at_or_above
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::comma()
    }
}

impl TryFrom<CsvSettings> for Configuration {
    type Error = CsvError;

    fn try_from(settings: CsvSettings) -> CsvResult<Self> {
        Self::new(settings)
    }
}

fn is_line_break(c: char) -> bool {
    c == '\r' || c == '\n'
}

fn validate(s: &CsvSettings) -> CsvResult<()> {
    let Some(first) = s.delimiter.chars().next() else {
        return Err(CsvError::configuration("delimiter must not be empty"));
    };
    if s.delimiter.chars().any(is_line_break) {
        return Err(CsvError::configuration(format!(
            "delimiter {:?} must not contain a line break",
            s.delimiter
        )));
    }
    if s.buffer_size == 0 || s.buffer_size > MAX_BUFFER_SIZE {
        return Err(CsvError::configuration(format!(
            "buffer_size must be between 1 and {MAX_BUFFER_SIZE}, got {}",
            s.buffer_size
        )));
    }
    if s.excel_leading_zero_format && s.ignore_quotes {
        return Err(CsvError::configuration(
            "excel_leading_zero_format cannot be combined with ignore_quotes",
        ));
    }
    if !s.ignore_quotes {
        if is_line_break(s.quote) || is_line_break(s.escape) {
            return Err(CsvError::configuration(
                "quote and escape chars must not be line breaks",
            ));
        }
        if s.delimiter.contains(s.quote) {
            return Err(CsvError::configuration(format!(
                "delimiter {:?} must not contain the quote char {:?}",
                s.delimiter, s.quote
            )));
        }
    }
    if s.allow_comments {
        if s.comment == first {
            return Err(CsvError::configuration(format!(
                "comment char {:?} must not start the delimiter",
                s.comment
            )));
        }
        if !s.ignore_quotes && s.comment == s.quote {
            return Err(CsvError::configuration(format!(
                "comment char {:?} must differ from the quote char",
                s.comment
            )));
        }
    }
    Ok(())
}
