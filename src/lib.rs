//! `rust-csv-streaming` is a streaming CSV tokenizer: it turns a byte stream into logical
//! records (ordered field sequences) one record at a time, without loading the input into
//! memory.
//!
//! The primary entrypoint is [`reader::CsvReader`], configured by a validated
//! [`config::Configuration`].
//!
//! ## What the tokenizer handles
//!
//! - quoted fields with embedded delimiters and line breaks, doubled quotes (`""`) or a
//!   distinct escape char
//! - delimiters longer than one char (`"::"`, `"||"`, ...)
//! - `\r\n`, `\r` and `\n` line terminators
//! - comment lines, blank-line skipping, field trimming
//! - the spreadsheet leading-zero convention `="007"` → `007`
//! - UTF-8 (with or without a byte-order mark) and Latin-1 input
//!
//! ## Strictness
//!
//! Fields that are malformed (data after a closing quote, a quote left open at end of stream)
//! are either tolerated, reported to a bad-data callback, or rejected with
//! [`CsvError::MalformedRecord`], depending on
//! [`config::CsvSettings::strict_bad_data`]. With
//! [`config::CsvSettings::detect_width_drift`], records whose field count differs from the
//! first record are rejected too.
//!
//! ## Quick example
//!
//! ```rust
//! use rust_csv_streaming::{Configuration, CsvReader, CsvSettings};
//!
//! # fn main() -> Result<(), rust_csv_streaming::CsvError> {
//! let config = Configuration::new(CsvSettings {
//!     delimiter: "::".to_string(),
//!     allow_comments: true,
//!     excel_leading_zero_format: true,
//!     ..Default::default()
//! })?;
//!
//! let input = "# exported 2024-01-01\nsku::qty\n=\"007\"::3\n";
//! let mut reader = CsvReader::new(input.as_bytes(), config);
//!
//! let mut rows = Vec::new();
//! for record in reader.records() {
//!     rows.push(record?.to_vec());
//! }
//! assert_eq!(rows, vec![vec!["sku", "qty"], vec!["007", "3"]]);
//! assert_eq!(reader.current_logical_row(), 2);
//! assert_eq!(reader.current_raw_row(), 3);
//! # Ok(())
//! # }
//! ```
//!
//! ## Bad-data callback
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//!
//! use rust_csv_streaming::{Configuration, CsvReader};
//!
//! let bad = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&bad);
//! let config = Configuration::default().with_bad_data_callback(move |ctx| {
//!     sink.lock().unwrap().push(ctx.field.to_string());
//! });
//!
//! let mut reader = CsvReader::new("\"a\"x,b\n".as_bytes(), config);
//! let record = reader.read_record().unwrap().unwrap();
//! assert_eq!(record, vec!["ax", "b"]);
//! assert_eq!(*bad.lock().unwrap(), vec!["\"a\"x".to_string()]);
//! ```
//!
//! ## Modules
//!
//! - [`reader`]: the public pull API
//! - [`config`]: settings, validation, bad-data callback
//! - [`types`]: [`types::Record`] and [`types::ParsePosition`]
//! - [`observability`]: observer hooks for records, bad data and failures
//! - [`error`]: error types

pub mod config;
pub mod error;
pub mod observability;
pub mod reader;
mod scanner;
mod tokenizer;
pub mod types;
mod validation;

pub use config::{BadDataContext, Configuration, CsvSettings, Encoding};
pub use error::{BadDataReason, CsvError, CsvResult, MalformedKind};
pub use reader::CsvReader;
pub use types::{ParsePosition, Record};
