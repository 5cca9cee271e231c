//! Record width validation.
//!
//! The first emitted record establishes the field-count baseline. With width-drift detection
//! enabled, later records must match it: in incremental mode a record fails as soon as it grows
//! past the baseline, and every completed record is checked once more so narrower records are
//! caught too.

use crate::error::MalformedKind;

#[derive(Debug, Clone)]
pub(crate) struct RecordValidator {
    enabled: bool,
    incremental: bool,
    expected: Option<usize>,
}

impl RecordValidator {
    pub(crate) fn new(enabled: bool, incremental: bool) -> Self {
        Self {
            enabled,
            incremental,
            expected: None,
        }
    }

    /// Baseline field count, once a record has been emitted.
    pub(crate) fn field_count(&self) -> Option<usize> {
        self.expected
    }

    /// Check after the field at 1-based `count` completed, while the record is still open.
    pub(crate) fn check_field(&self, count: usize) -> Result<(), MalformedKind> {
        match self.expected {
            Some(expected) if self.enabled && self.incremental && count > expected => {
                Err(MalformedKind::WidthDrift {
                    expected,
                    actual: count,
                })
            }
            _ => Ok(()),
        }
    }

    /// Check a completed record of `count` fields; the first one sets the baseline.
    pub(crate) fn check_record(&mut self, count: usize) -> Result<(), MalformedKind> {
        match self.expected {
            None => {
                self.expected = Some(count);
                Ok(())
            }
            Some(expected) if self.enabled && count != expected => Err(MalformedKind::WidthDrift {
                expected,
                actual: count,
            }),
            Some(_) => Ok(()),
        }
    }
}
