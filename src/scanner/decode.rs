//! Incremental byte → char decoding.
//!
//! Reads hand the scanner arbitrary byte chunks, so a multi-byte UTF-8 sequence may be split
//! across two refills. The decoder keeps the partial sequence between calls.

use crate::config::Encoding;

/// Result of feeding one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decoded {
    /// Need more bytes.
    Pending,
    Char(char),
    /// Invalid sequence.
    Invalid,
}

#[derive(Debug, Clone)]
pub(crate) struct Decoder {
    encoding: Encoding,
    buffer: [u8; 4],
    len: usize,
    expected: usize,
}

impl Decoder {
    pub(crate) fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            buffer: [0; 4],
            len: 0,
            expected: 0,
        }
    }

    /// True while in the middle of a multi-byte sequence.
    pub(crate) fn is_pending(&self) -> bool {
        self.len > 0
    }

    fn reset(&mut self) {
        self.len = 0;
        self.expected = 0;
    }

    pub(crate) fn feed(&mut self, byte: u8) -> Decoded {
        if self.encoding == Encoding::Latin1 {
            return Decoded::Char(char::from(byte));
        }

        // ASCII fast path
        if self.len == 0 && byte < 0x80 {
            return Decoded::Char(char::from(byte));
        }

        if self.len == 0 {
            self.expected = match byte {
                b if b & 0b1110_0000 == 0b1100_0000 => 2,
                b if b & 0b1111_0000 == 0b1110_0000 => 3,
                b if b & 0b1111_1000 == 0b1111_0000 => 4,
                _ => return Decoded::Invalid,
            };
            self.buffer[0] = byte;
            self.len = 1;
            return Decoded::Pending;
        }

        if byte & 0b1100_0000 != 0b1000_0000 {
            self.reset();
            return Decoded::Invalid;
        }

        self.buffer[self.len] = byte;
        self.len += 1;
        if self.len < self.expected {
            return Decoded::Pending;
        }

        // from_utf8 rejects overlong forms and surrogates.
        let decoded = std::str::from_utf8(&self.buffer[..self.len])
            .ok()
            .and_then(|s| s.chars().next());
        self.reset();
        match decoded {
            Some(c) => Decoded::Char(c),
            None => Decoded::Invalid,
        }
    }
}
