//! Observer hooks for reader outcomes.
//!
//! Attach an observer with [`crate::config::Configuration::with_observer`]. The reader reports
//! every emitted record, every bad field (before the bad-data policy is applied) and every
//! failed read, with a severity computed from the error.

use std::fmt;
use std::sync::Arc;

use crate::config::BadDataContext;
use crate::error::CsvError;
use crate::types::ParsePosition;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParseSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (the read failed).
    Error,
    /// Critical error (stream failures).
    Critical,
}

impl ParseSeverity {
    /// Severity of a failed read.
    pub fn for_error(error: &CsvError) -> Self {
        match error {
            CsvError::Stream(_) => Self::Critical,
            CsvError::MalformedRecord { .. } => Self::Error,
            CsvError::Configuration { .. } | CsvError::Disposed => Self::Error,
        }
    }
}

/// Observer interface for reader events.
///
/// Implementors can record metrics, logs, or trigger alerts. Callbacks run synchronously on the
/// reading thread and must not call back into the reader.
pub trait ParseObserver: Send + Sync {
    /// Called after a record is emitted.
    fn on_record(&self, _position: &ParsePosition, _field_count: usize) {}

    /// Called when a bad field completes.
    fn on_bad_data(&self, _ctx: &BadDataContext<'_>) {}

    /// Called when a read fails.
    fn on_failure(&self, _position: &ParsePosition, _severity: ParseSeverity, _error: &CsvError) {}

    /// Called when a failure meets the configured alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, position: &ParsePosition, severity: ParseSeverity, error: &CsvError) {
        self.on_failure(position, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ParseObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn ParseObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl ParseObserver for CompositeObserver {
    fn on_record(&self, position: &ParsePosition, field_count: usize) {
        for o in &self.observers {
            o.on_record(position, field_count);
        }
    }

    fn on_bad_data(&self, ctx: &BadDataContext<'_>) {
        for o in &self.observers {
            o.on_bad_data(ctx);
        }
    }

    fn on_failure(&self, position: &ParsePosition, severity: ParseSeverity, error: &CsvError) {
        for o in &self.observers {
            o.on_failure(position, severity, error);
        }
    }

    fn on_alert(&self, position: &ParsePosition, severity: ParseSeverity, error: &CsvError) {
        for o in &self.observers {
            o.on_alert(position, severity, error);
        }
    }
}

/// Writes reader events through the `log` facade.
#[derive(Debug, Default)]
pub struct LogObserver;

impl ParseObserver for LogObserver {
    fn on_record(&self, position: &ParsePosition, field_count: usize) {
        log::trace!("[csv][record] {position} fields={field_count}");
    }

    fn on_bad_data(&self, ctx: &BadDataContext<'_>) {
        log::warn!(
            "[csv][bad-data] {} at {} raw={:?}",
            ctx.reason,
            ctx.position,
            ctx.field
        );
    }

    fn on_failure(&self, position: &ParsePosition, severity: ParseSeverity, error: &CsvError) {
        log::error!("[csv][{severity:?}] {position} err={error}");
    }

    fn on_alert(&self, position: &ParsePosition, severity: ParseSeverity, error: &CsvError) {
        log::error!("[ALERT][csv][{severity:?}] {position} err={error}");
    }
}
