//! The record state machine.
//!
//! [`Tokenizer`] pulls chars from a [`BufferedScanner`] and splits them into fields and records.
//! Every transition is driven by the current [`State`] and one char; multi-char delimiters and
//! `\r\n` are recognised by peeking ahead without consuming, so a failed partial delimiter match
//! simply leaves the candidate char in the field and matching resumes at the next char.
//!
//! Field text accumulates in one reusable buffer; the raw text of the current record is kept
//! alongside for [`crate::reader::CsvReader::raw_record`] and bad-data reporting.

mod state;

use std::io::Read;
use std::sync::Arc;

use crate::config::{BadDataContext, Configuration};
use crate::error::{BadDataReason, CsvError, CsvResult, MalformedKind};
use crate::scanner::BufferedScanner;
use crate::types::{ParsePosition, Record};
use crate::validation::RecordValidator;

use state::{is_line_break, Dialect, FieldFlags, State};

/// What the reader loop does after one char.
enum Flow {
    Continue,
    EndRecord,
    /// Blank or comment line: start the record over.
    SkipRecord,
}

pub(crate) struct Tokenizer {
    config: Arc<Configuration>,
    dialect: Dialect,
    delimiter: Vec<char>,
    validator: RecordValidator,

    state: State,
    flags: FieldFlags,
    field: String,
    /// Trim spaces seen after a closing quote, kept until the next char shows whether the
    /// field ends or continues with trailing data.
    pending_space: String,
    raw: String,
    field_raw_start: usize,
    /// Length of `raw` before the char being processed.
    mark: usize,
    record_raw_row: u64,
    logical_row: u64,
    /// Set while skipping the rest of a record that already failed.
    discarding: bool,
}

impl Tokenizer {
    pub(crate) fn new(config: Arc<Configuration>) -> Self {
        let settings = config.settings();
        Self {
            dialect: Dialect::new(settings),
            delimiter: config.delimiter_chars().to_vec(),
            validator: RecordValidator::new(
                settings.detect_width_drift,
                settings.incremental_width_check,
            ),
            config,
            state: State::RecordStart,
            flags: FieldFlags::default(),
            field: String::with_capacity(64),
            pending_space: String::new(),
            raw: String::with_capacity(256),
            field_raw_start: 0,
            mark: 0,
            record_raw_row: 0,
            logical_row: 0,
            discarding: false,
        }
    }

    /// Number of records emitted so far.
    pub(crate) fn logical_row(&self) -> u64 {
        self.logical_row
    }

    /// Raw text of the last record read (or of the failed one).
    pub(crate) fn raw_record(&self) -> &str {
        &self.raw
    }

    pub(crate) fn field_count(&self) -> Option<usize> {
        self.validator.field_count()
    }

    /// Read the next record into `record`; `false` at end of stream.
    pub(crate) fn read_record<R: Read>(
        &mut self,
        sc: &mut BufferedScanner<R>,
        record: &mut Record,
    ) -> CsvResult<bool> {
        if self.state != State::RecordStart {
            self.discard_remainder(sc)?;
        }
        record.clear();
        self.begin_record();
        self.run(sc, record)
    }

    /// Finish a record abandoned by an error so the next read starts at a record boundary.
    fn discard_remainder<R: Read>(&mut self, sc: &mut BufferedScanner<R>) -> CsvResult<()> {
        log::debug!(
            "discarding remainder of malformed record at raw row {}",
            sc.raw_row()
        );
        let mut scratch = Record::new();
        self.discarding = true;
        let result = self.run(sc, &mut scratch);
        self.discarding = false;
        if result.is_err() {
            self.state = State::RecordStart;
        }
        result.map(|_| ())
    }

    fn begin_record(&mut self) {
        self.state = State::RecordStart;
        self.flags = FieldFlags::default();
        self.field.clear();
        self.pending_space.clear();
        self.raw.clear();
        self.field_raw_start = 0;
        self.mark = 0;
    }

    fn run<R: Read>(&mut self, sc: &mut BufferedScanner<R>, record: &mut Record) -> CsvResult<bool> {
        loop {
            self.mark = self.raw.len();
            let Some(c) = self.bump(sc)? else {
                return self.finish_at_eof(sc, record);
            };
            match self.step(c, sc, record)? {
                Flow::Continue => {}
                Flow::EndRecord => return Ok(true),
                Flow::SkipRecord => {
                    record.clear();
                    self.begin_record();
                }
            }
        }
    }

    /// Consume one char, recording it in the raw text.
    fn bump<R: Read>(&mut self, sc: &mut BufferedScanner<R>) -> CsvResult<Option<char>> {
        let c = sc.next_char()?;
        if let Some(c) = c {
            self.raw.push(c);
        }
        Ok(c)
    }

    fn step<R: Read>(
        &mut self,
        c: char,
        sc: &mut BufferedScanner<R>,
        record: &mut Record,
    ) -> CsvResult<Flow> {
        match self.state {
            State::RecordStart => self.record_start(c, sc, record),
            State::FieldStart => self.field_start(c, sc, record),
            State::Unquoted => self.unquoted(c, sc, record),
            State::Quoted => Ok(self.quoted(c)),
            State::QuotedEscape => Ok(self.quoted_escape(c)),
            State::QuoteInQuoted => self.quote_in_quoted(c, sc, record),
            State::AfterQuoted => self.after_quoted(c, sc, record),
            State::ExcelNumeric => self.excel_numeric(c, sc, record),
            State::ExcelNumericClosed => self.excel_numeric_closed(c, sc, record),
            State::Comment => self.comment(c, sc),
        }
    }

    fn record_start<R: Read>(
        &mut self,
        c: char,
        sc: &mut BufferedScanner<R>,
        record: &mut Record,
    ) -> CsvResult<Flow> {
        self.record_raw_row = sc.raw_row();

        if self.dialect.allow_comments && c == self.dialect.comment {
            self.state = State::Comment;
            return Ok(Flow::Continue);
        }

        if is_line_break(c) {
            self.absorb_line_feed(c, sc)?;
            if self.dialect.skip_blank_lines {
                log::trace!("skipping blank line at raw row {}", self.record_raw_row);
                return Ok(Flow::SkipRecord);
            }
            return self.end_line(sc, record);
        }

        self.state = State::FieldStart;
        self.field_start(c, sc, record)
    }

    fn field_start<R: Read>(
        &mut self,
        c: char,
        sc: &mut BufferedScanner<R>,
        record: &mut Record,
    ) -> CsvResult<Flow> {
        let d = self.dialect;
        if d.trim_fields && d.is_trim_space(c) {
            return Ok(Flow::Continue);
        }

        if d.excel_leading_zero_format && c == '=' && sc.peek(0)? == Some(d.quote) {
            self.bump(sc)?;
            self.field.push('=');
            self.field.push(d.quote);
            self.state = State::ExcelNumeric;
            return Ok(Flow::Continue);
        }

        if d.honor_quotes && c == d.quote {
            self.flags.quoted = true;
            self.state = State::Quoted;
            return Ok(Flow::Continue);
        }

        self.state = State::Unquoted;
        self.unquoted(c, sc, record)
    }

    fn unquoted<R: Read>(
        &mut self,
        c: char,
        sc: &mut BufferedScanner<R>,
        record: &mut Record,
    ) -> CsvResult<Flow> {
        if self.delimiter_ahead(c, sc)? {
            for _ in 1..self.delimiter.len() {
                self.bump(sc)?;
            }
            self.state = State::FieldStart;
            self.complete_field(sc, record)?;
            return Ok(Flow::Continue);
        }

        if is_line_break(c) {
            self.absorb_line_feed(c, sc)?;
            return self.end_line(sc, record);
        }

        self.field.push(c);
        Ok(Flow::Continue)
    }

    fn quoted(&mut self, c: char) -> Flow {
        let d = self.dialect;
        if c == d.escape && !d.doubles_quotes() {
            self.state = State::QuotedEscape;
        } else if c == d.quote {
            self.state = if d.doubles_quotes() {
                State::QuoteInQuoted
            } else {
                State::AfterQuoted
            };
        } else {
            if is_line_break(c) && d.line_break_in_quoted_field_is_bad_data {
                self.flags.mark_bad(BadDataReason::LineBreakInQuotedField);
            }
            self.field.push(c);
        }
        Flow::Continue
    }

    fn quoted_escape(&mut self, c: char) -> Flow {
        if c != self.dialect.quote && c != self.dialect.escape {
            self.field.push(self.dialect.escape);
        }
        self.field.push(c);
        self.state = State::Quoted;
        Flow::Continue
    }

    fn quote_in_quoted<R: Read>(
        &mut self,
        c: char,
        sc: &mut BufferedScanner<R>,
        record: &mut Record,
    ) -> CsvResult<Flow> {
        if c == self.dialect.quote {
            self.field.push(c);
            self.state = State::Quoted;
            return Ok(Flow::Continue);
        }
        self.state = State::AfterQuoted;
        self.after_quoted(c, sc, record)
    }

    fn after_quoted<R: Read>(
        &mut self,
        c: char,
        sc: &mut BufferedScanner<R>,
        record: &mut Record,
    ) -> CsvResult<Flow> {
        if self.dialect.trim_fields && self.dialect.is_trim_space(c) {
            self.pending_space.push(c);
            return Ok(Flow::Continue);
        }
        if !is_line_break(c) && !self.delimiter_ahead(c, sc)? {
            self.flags.mark_bad(BadDataReason::TrailingAfterQuote);
            self.field.push_str(&self.pending_space);
        }
        self.pending_space.clear();
        self.state = State::Unquoted;
        self.unquoted(c, sc, record)
    }

    fn excel_numeric<R: Read>(
        &mut self,
        c: char,
        sc: &mut BufferedScanner<R>,
        record: &mut Record,
    ) -> CsvResult<Flow> {
        if c.is_ascii_digit() {
            self.field.push(c);
            return Ok(Flow::Continue);
        }
        if c == self.dialect.quote {
            self.state = State::ExcelNumericClosed;
            return Ok(Flow::Continue);
        }
        // not `="<digits>"`: what was read stays as literal text
        self.state = State::Unquoted;
        self.unquoted(c, sc, record)
    }

    fn excel_numeric_closed<R: Read>(
        &mut self,
        c: char,
        sc: &mut BufferedScanner<R>,
        record: &mut Record,
    ) -> CsvResult<Flow> {
        if self.dialect.trim_fields && self.dialect.is_trim_space(c) {
            self.pending_space.push(c);
            return Ok(Flow::Continue);
        }
        if is_line_break(c) || self.delimiter_ahead(c, sc)? {
            self.field.drain(..self.dialect.excel_prefix_len());
        } else {
            self.field.push(self.dialect.quote);
            self.field.push_str(&self.pending_space);
        }
        self.pending_space.clear();
        self.state = State::Unquoted;
        self.unquoted(c, sc, record)
    }

    fn comment<R: Read>(&mut self, c: char, sc: &mut BufferedScanner<R>) -> CsvResult<Flow> {
        if !is_line_break(c) {
            return Ok(Flow::Continue);
        }
        self.absorb_line_feed(c, sc)?;
        log::trace!("skipped comment line at raw row {}", self.record_raw_row);
        Ok(Flow::SkipRecord)
    }

    /// True when `c` starts a full delimiter match; nothing past `c` is consumed.
    fn delimiter_ahead<R: Read>(&self, c: char, sc: &mut BufferedScanner<R>) -> CsvResult<bool> {
        if c != self.delimiter[0] {
            return Ok(false);
        }
        for (offset, &expected) in self.delimiter[1..].iter().enumerate() {
            if sc.peek(offset)? != Some(expected) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Fold the `\n` of a `\r\n` pair into the `\r` just consumed.
    fn absorb_line_feed<R: Read>(&mut self, c: char, sc: &mut BufferedScanner<R>) -> CsvResult<()> {
        if c == '\r' && sc.peek(0)? == Some('\n') {
            self.bump(sc)?;
        }
        Ok(())
    }

    fn finish_at_eof<R: Read>(
        &mut self,
        sc: &mut BufferedScanner<R>,
        record: &mut Record,
    ) -> CsvResult<bool> {
        match self.state {
            State::RecordStart | State::Comment => {
                self.state = State::RecordStart;
                return Ok(false);
            }
            State::Quoted | State::QuotedEscape => {
                if self.state == State::QuotedEscape {
                    self.field.push(self.dialect.escape);
                }
                self.flags.mark_bad(BadDataReason::UnterminatedQuote);
            }
            State::ExcelNumericClosed => {
                self.field.drain(..self.dialect.excel_prefix_len());
            }
            State::FieldStart
            | State::Unquoted
            | State::QuoteInQuoted
            | State::AfterQuoted
            | State::ExcelNumeric => {}
        }
        self.end_line(sc, record)?;
        Ok(true)
    }

    fn end_line<R: Read>(
        &mut self,
        sc: &mut BufferedScanner<R>,
        record: &mut Record,
    ) -> CsvResult<Flow> {
        self.state = State::RecordStart;
        self.complete_field(sc, record)?;
        self.complete_record(sc, record)
    }

    fn complete_field<R: Read>(
        &mut self,
        sc: &BufferedScanner<R>,
        record: &mut Record,
    ) -> CsvResult<()> {
        if let Some(reason) = self.flags.bad {
            self.handle_bad_data(reason, sc)?;
        }
        if !self.discarding {
            self.validator
                .check_field(record.len() + 1)
                .map_err(|kind| self.malformed(kind, sc))?;
        }

        let d = self.dialect;
        let trim = if self.flags.quoted {
            d.trim_inside_quotes
        } else {
            d.trim_fields
        };
        let value = if trim {
            self.field.trim_matches(|c| d.is_trim_space(c))
        } else {
            self.field.as_str()
        };
        record.push_field(value);

        self.field.clear();
        self.pending_space.clear();
        self.flags = FieldFlags::default();
        self.field_raw_start = self.raw.len();
        Ok(())
    }

    fn complete_record<R: Read>(
        &mut self,
        sc: &BufferedScanner<R>,
        record: &mut Record,
    ) -> CsvResult<Flow> {
        if self.discarding {
            return Ok(Flow::EndRecord);
        }
        self.validator
            .check_record(record.len())
            .map_err(|kind| self.malformed(kind, sc))?;

        self.logical_row += 1;
        record.set_rows(self.record_raw_row, self.logical_row);
        if let Some(observer) = self.config.observer() {
            let position = ParsePosition {
                logical_row: self.logical_row,
                ..sc.position()
            };
            observer.on_record(&position, record.len());
        }
        Ok(Flow::EndRecord)
    }

    /// Apply the bad-data policy to the field that just completed.
    fn handle_bad_data<R: Read>(
        &self,
        reason: BadDataReason,
        sc: &BufferedScanner<R>,
    ) -> CsvResult<()> {
        if self.discarding {
            return Ok(());
        }

        let ctx = BadDataContext {
            reason,
            field: &self.raw[self.field_raw_start..self.mark],
            raw_record: &self.raw,
            position: self.position(sc),
        };
        if let Some(observer) = self.config.observer() {
            observer.on_bad_data(&ctx);
        }

        if self.dialect.strict_bad_data {
            let kind = MalformedKind::BadData {
                reason,
                field: ctx.field.to_owned(),
            };
            return Err(self.malformed(kind, sc));
        }

        match self.config.bad_data_callback() {
            Some(callback) => callback(&ctx),
            None => log::debug!("tolerating bad field at {}: {reason}", ctx.position),
        }
        Ok(())
    }

    /// Position of the record being read.
    fn position<R: Read>(&self, sc: &BufferedScanner<R>) -> ParsePosition {
        ParsePosition {
            logical_row: self.logical_row + 1,
            ..sc.position()
        }
    }

    fn malformed<R: Read>(&self, kind: MalformedKind, sc: &BufferedScanner<R>) -> CsvError {
        CsvError::MalformedRecord {
            kind,
            position: self.position(sc),
            raw_record: self.raw.clone(),
        }
    }
}
