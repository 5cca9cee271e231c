use crate::config::CsvSettings;
use crate::error::BadDataReason;

/// Tokenizer state between two consumed chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    /// Nothing consumed for the current record yet
    RecordStart,
    /// At the first char of a field (leading trim whitespace stays here)
    FieldStart,
    Unquoted,
    Quoted,
    /// Escape char seen inside a quoted field (escape differs from quote)
    QuotedEscape,
    /// Quote seen inside a quoted field: either a doubled quote or the closing one
    QuoteInQuoted,
    /// Closing quote consumed, waiting for a terminator
    AfterQuoted,
    /// Inside `="...`, digits only so far
    ExcelNumeric,
    /// `="<digits>"` read; a terminator must follow for the unwrap to apply
    ExcelNumericClosed,
    /// Discarding a comment line
    Comment,
}

/// Per-field flags, reset whenever a field completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FieldFlags {
    pub(crate) quoted: bool,
    pub(crate) bad: Option<BadDataReason>,
}

impl FieldFlags {
    /// Keep the first reason a field went bad.
    pub(crate) fn mark_bad(&mut self, reason: BadDataReason) {
        self.bad.get_or_insert(reason);
    }
}

/// The settings the state machine consults per char, copied out of the configuration.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Dialect {
    pub(crate) quote: char,
    pub(crate) escape: char,
    pub(crate) comment: char,
    pub(crate) allow_comments: bool,
    pub(crate) honor_quotes: bool,
    pub(crate) trim_fields: bool,
    pub(crate) trim_inside_quotes: bool,
    pub(crate) skip_blank_lines: bool,
    pub(crate) excel_leading_zero_format: bool,
    pub(crate) strict_bad_data: bool,
    pub(crate) line_break_in_quoted_field_is_bad_data: bool,
    delimiter_start: char,
}

impl Dialect {
    pub(crate) fn new(s: &CsvSettings) -> Self {
        Self {
            quote: s.quote,
            escape: s.escape,
            comment: s.comment,
            allow_comments: s.allow_comments,
            honor_quotes: !s.ignore_quotes,
            trim_fields: s.trim_fields,
            trim_inside_quotes: s.trim_inside_quotes,
            skip_blank_lines: s.skip_blank_lines,
            excel_leading_zero_format: s.excel_leading_zero_format,
            strict_bad_data: s.strict_bad_data,
            line_break_in_quoted_field_is_bad_data: s.line_break_in_quoted_field_is_bad_data,
            delimiter_start: s.delimiter.chars().next().unwrap_or(','),
        }
    }

    /// True when a quote inside a quoted field may be doubled to escape it.
    pub(crate) fn doubles_quotes(&self) -> bool {
        self.escape == self.quote
    }

    /// Whitespace removed by trimming; never the delimiter's first char.
    pub(crate) fn is_trim_space(&self, c: char) -> bool {
        (c == ' ' || c == '\t') && c != self.delimiter_start
    }

    /// Byte length of the `=` + quote prefix of an Excel numeric field.
    pub(crate) fn excel_prefix_len(&self) -> usize {
        '='.len_utf8() + self.quote.len_utf8()
    }
}

pub(crate) fn is_line_break(c: char) -> bool {
    c == '\r' || c == '\n'
}
