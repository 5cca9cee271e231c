//! Pull-based record reader.
//!
//! [`CsvReader`] owns the input stream and hands out one record per call. There is no
//! read-ahead beyond the look-ahead the tokenizer needs, no background thread and no internal
//! queue; a call blocks only as long as the underlying stream does.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::config::Configuration;
use crate::error::{CsvError, CsvResult};
use crate::observability::ParseSeverity;
use crate::scanner::BufferedScanner;
use crate::tokenizer::Tokenizer;
use crate::types::{ParsePosition, Record};

/// Streaming CSV reader over any [`Read`] source.
///
/// # Examples
///
/// ```rust
/// use rust_csv_streaming::{Configuration, CsvReader};
///
/// # fn main() -> Result<(), rust_csv_streaming::CsvError> {
/// let input = "id,name\n1,\"Ada, Countess\"\n";
/// let mut reader = CsvReader::new(input.as_bytes(), Configuration::default());
///
/// let header = reader.read_record()?.unwrap();
/// assert_eq!(header, vec!["id", "name"]);
///
/// let row = reader.read_record()?.unwrap();
/// assert_eq!(row.get(1), Some("Ada, Countess"));
/// assert!(reader.read_record()?.is_none());
/// # Ok(())
/// # }
/// ```
pub struct CsvReader<R> {
    config: Arc<Configuration>,
    scanner: BufferedScanner<R>,
    tokenizer: Tokenizer,
}

impl<R: Read> CsvReader<R> {
    /// Create a reader that takes ownership of `source`.
    pub fn new(source: R, config: impl Into<Arc<Configuration>>) -> Self {
        let config = config.into();
        Self {
            scanner: BufferedScanner::new(source, config.settings()),
            tokenizer: Tokenizer::new(Arc::clone(&config)),
            config,
        }
    }

    /// Read the next record into a new [`Record`]; `Ok(None)` at end of stream.
    ///
    /// # Errors
    ///
    /// - [`CsvError::MalformedRecord`] when width-drift detection or strict bad-data handling
    ///   rejects the record. The next call continues with the following record.
    /// - [`CsvError::Stream`] on I/O or decoding failures.
    /// - [`CsvError::Disposed`] after [`Self::close`].
    pub fn read_record(&mut self) -> CsvResult<Option<Record>> {
        let mut record = Record::new();
        Ok(self.read_record_into(&mut record)?.then_some(record))
    }

    /// Read the next record into `record`, reusing its storage.
    ///
    /// Returns `false` at end of stream (leaving `record` empty).
    pub fn read_record_into(&mut self, record: &mut Record) -> CsvResult<bool> {
        let result = if self.scanner.is_closed() {
            Err(CsvError::Disposed)
        } else {
            self.tokenizer.read_record(&mut self.scanner, record)
        };

        if let Err(e) = &result {
            self.report_failure(e);
        }
        result
    }

    /// Iterate the remaining records.
    ///
    /// Malformed records are yielded as errors and iteration continues; a stream error or use
    /// after close ends the iteration.
    pub fn records(&mut self) -> RecordsIter<'_, R> {
        RecordsIter {
            reader: self,
            done: false,
        }
    }

    fn report_failure(&self, error: &CsvError) {
        let Some(observer) = self.config.observer() else {
            return;
        };
        let position = self.position();
        let severity = ParseSeverity::for_error(error);
        observer.on_failure(&position, severity, error);
        if severity >= self.config.alert_at_or_above() {
            observer.on_alert(&position, severity, error);
        }
    }

    /// Release the underlying stream. Later reads fail with [`CsvError::Disposed`].
    pub fn close(&mut self) {
        self.scanner.close();
    }

    pub fn is_closed(&self) -> bool {
        self.scanner.is_closed()
    }

    /// Current position; `logical_row` counts emitted records.
    pub fn position(&self) -> ParsePosition {
        ParsePosition {
            logical_row: self.tokenizer.logical_row(),
            ..self.scanner.position()
        }
    }

    pub fn current_raw_row(&self) -> u64 {
        self.scanner.raw_row()
    }

    pub fn current_logical_row(&self) -> u64 {
        self.tokenizer.logical_row()
    }

    pub fn current_char_position(&self) -> u64 {
        self.scanner.position().char_position
    }

    /// `None` unless byte counting is enabled in the settings.
    pub fn current_byte_position(&self) -> Option<u64> {
        self.scanner.position().byte_position
    }

    /// Raw text (terminator included) of the most recent record.
    pub fn raw_record(&self) -> &str {
        self.tokenizer.raw_record()
    }

    /// Field count of the first emitted record, the width-drift baseline.
    pub fn field_count(&self) -> Option<usize> {
        self.tokenizer.field_count()
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }
}

impl CsvReader<File> {
    /// Open `path` and read it with `config`.
    ///
    /// ```no_run
    /// use rust_csv_streaming::{Configuration, CsvReader};
    ///
    /// # fn main() -> Result<(), rust_csv_streaming::CsvError> {
    /// let mut reader = CsvReader::from_path("people.csv", Configuration::default())?;
    /// for record in reader.records() {
    ///     let record = record?;
    ///     println!("{}: {:?}", record.logical_row(), record.to_vec());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_path(path: impl AsRef<Path>, config: impl Into<Arc<Configuration>>) -> CsvResult<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file, config))
    }
}

/// Iterator returned by [`CsvReader::records`].
pub struct RecordsIter<'r, R> {
    reader: &'r mut CsvReader<R>,
    done: bool,
}

impl<R: Read> Iterator for RecordsIter<'_, R> {
    type Item = CsvResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                if matches!(e, CsvError::Stream(_) | CsvError::Disposed) {
                    self.done = true;
                }
                Some(Err(e))
            }
        }
    }
}
