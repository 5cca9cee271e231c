//! Bounded look-ahead character source over a byte stream.
//!
//! The scanner owns the underlying stream, reads it in `buffer_size` chunks, decodes the bytes
//! and hands chars to the tokenizer one at a time. Unconsumed chars survive a refill, so
//! [`BufferedScanner::peek`] works across buffer seams. Raw-row accounting carries the last
//! consumed char across refills so a `\r\n` split between two reads counts as one line break.

mod decode;

use std::io::{self, Read};

use crate::config::{CsvSettings, Encoding};
use crate::error::{CsvError, CsvResult};
use crate::types::ParsePosition;

use decode::{Decoded, Decoder};

const BYTE_ORDER_MARK: char = '\u{FEFF}';

pub(crate) struct BufferedScanner<R> {
    source: Option<R>,
    encoding: Encoding,
    bytes: Vec<u8>,
    chars: Vec<char>,
    pos: usize,
    decoder: Decoder,
    eof: bool,
    at_stream_start: bool,
    /// Set by the first read or decoding failure; every later access fails the same way.
    failure: Option<(io::ErrorKind, String)>,

    previous: Option<char>,
    at_line_start: bool,
    char_position: u64,
    byte_position: Option<u64>,
    raw_row: u64,
}

impl<R: Read> BufferedScanner<R> {
    pub(crate) fn new(source: R, settings: &CsvSettings) -> Self {
        Self {
            source: Some(source),
            encoding: settings.encoding,
            bytes: vec![0; settings.buffer_size.max(1)],
            chars: Vec::with_capacity(settings.buffer_size.max(1)),
            pos: 0,
            decoder: Decoder::new(settings.encoding),
            eof: false,
            at_stream_start: true,
            failure: None,
            previous: None,
            at_line_start: true,
            char_position: 0,
            byte_position: settings.count_bytes.then_some(0),
            raw_row: 0,
        }
    }

    /// Refill from the stream, keeping unconsumed chars.
    ///
    /// Returns the number of chars added; zero only at end of stream.
    pub(crate) fn fill(&mut self) -> CsvResult<usize> {
        self.check_usable()?;
        match self.refill() {
            Err(CsvError::Stream(e)) => {
                log::debug!("scanner failed at char {}: {e}", self.char_position);
                self.failure = Some((e.kind(), e.to_string()));
                self.chars.clear();
                self.pos = 0;
                Err(CsvError::Stream(e))
            }
            other => other,
        }
    }

    fn refill(&mut self) -> CsvResult<usize> {
        if self.pos > 0 {
            self.chars.drain(..self.pos);
            self.pos = 0;
        }

        let before = self.chars.len();
        while self.chars.len() == before && !self.eof {
            let Some(source) = self.source.as_mut() else {
                return Err(CsvError::Disposed);
            };
            let n = loop {
                match source.read(&mut self.bytes) {
                    Ok(n) => break n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                }
            };

            if n == 0 {
                self.eof = true;
                if self.decoder.is_pending() {
                    return Err(invalid_data("stream ended inside a multi-byte sequence"));
                }
                break;
            }

            for i in 0..n {
                match self.decoder.feed(self.bytes[i]) {
                    Decoded::Pending => {}
                    Decoded::Char(c) => self.push_decoded(c),
                    Decoded::Invalid => {
                        return Err(invalid_data(&format!(
                            "invalid {:?} byte sequence near char {}",
                            self.encoding,
                            self.char_position + (self.chars.len() - self.pos) as u64
                        )));
                    }
                }
            }
        }

        let added = self.chars.len() - before;
        log::trace!("scanner refill: {added} chars buffered");
        Ok(added)
    }

    fn push_decoded(&mut self, c: char) {
        if self.at_stream_start {
            self.at_stream_start = false;
            if c == BYTE_ORDER_MARK && self.encoding == Encoding::Utf8 {
                if let Some(bytes) = self.byte_position.as_mut() {
                    *bytes += BYTE_ORDER_MARK.len_utf8() as u64;
                }
                return;
            }
        }
        self.chars.push(c);
    }

    /// Consume the next char; `None` at end of stream.
    pub(crate) fn next_char(&mut self) -> CsvResult<Option<char>> {
        self.check_usable()?;
        if self.pos >= self.chars.len() && self.fill()? == 0 {
            return Ok(None);
        }

        let c = self.chars[self.pos];
        self.pos += 1;
        self.track(c);
        Ok(Some(c))
    }

    /// Look at the char `offset` positions past the next one without consuming anything.
    pub(crate) fn peek(&mut self, offset: usize) -> CsvResult<Option<char>> {
        self.check_usable()?;
        while self.pos + offset >= self.chars.len() {
            if self.fill()? == 0 {
                return Ok(None);
            }
        }
        Ok(Some(self.chars[self.pos + offset]))
    }

    /// Fails after `close` or after an earlier stream failure.
    fn check_usable(&self) -> CsvResult<()> {
        if self.source.is_none() {
            return Err(CsvError::Disposed);
        }
        match &self.failure {
            Some((kind, message)) => Err(CsvError::Stream(io::Error::new(*kind, message.clone()))),
            None => Ok(()),
        }
    }

    fn track(&mut self, c: char) {
        let continues_crlf = c == '\n' && self.previous == Some('\r');
        if self.at_line_start && !continues_crlf {
            self.raw_row += 1;
        }
        self.at_line_start = c == '\r' || c == '\n';
        self.previous = Some(c);

        self.char_position += 1;
        if let Some(bytes) = self.byte_position.as_mut() {
            *bytes += self.encoding.encoded_len(c) as u64;
        }
    }

    /// Position of the scanner; `logical_row` is left at zero for the caller to fill.
    pub(crate) fn position(&self) -> ParsePosition {
        ParsePosition {
            char_position: self.char_position,
            byte_position: self.byte_position,
            raw_row: self.raw_row,
            logical_row: 0,
        }
    }

    pub(crate) fn raw_row(&self) -> u64 {
        self.raw_row
    }

    /// Drop the underlying stream.
    pub(crate) fn close(&mut self) {
        if self.source.take().is_some() {
            log::debug!("scanner closed at char {}", self.char_position);
        }
        self.chars.clear();
        self.pos = 0;
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.source.is_none()
    }
}

fn invalid_data(msg: &str) -> CsvError {
    CsvError::Stream(io::Error::new(io::ErrorKind::InvalidData, msg.to_string()))
}
