//! Error taxonomy for the track plan engine.
//!
//! Whole-document failures surface as [`TrackError`]. Failures confined to a
//! single plan line never escalate: they are reported as [`SkippedLine`]
//! entries carrying a [`LineError`] and the parse continues.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TrackError>;

/// A whole-document failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackError {
    /// Structurally invalid input (too few lines, malformed XML, bad header).
    #[error("invalid format: {0}")]
    Format(String),
    /// Structurally valid input without any usable record.
    #[error("no data: {0}")]
    NoData(String),
    /// No gateway header line was found in a plan.
    #[error("no gateway entries found (lines starting with '{marker}')")]
    NoGateway {
        /// The gateway marker that was searched for.
        marker: String,
    },
    /// Semantically unusable input.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Configuration could not be loaded or is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TrackError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    pub(crate) fn no_data(message: impl Into<String>) -> Self {
        Self::NoData(message.into())
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Why a single plan line could not be used as a track line.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineError {
    /// Fewer than five whitespace-separated fields.
    #[error("expected at least 5 fields, found {found}")]
    TooFewFields {
        /// Number of fields on the line.
        found: usize,
    },
    /// A start or end field is not a `YYYYMMDDHHMMSS[.fff]` timestamp.
    #[error("invalid timestamp '{value}'")]
    BadTimestamp {
        /// The offending field.
        value: String,
    },
    /// Data or recurrence marker differs from the configured markers.
    #[error("unexpected markers '{data} {recurrence}'")]
    UnexpectedMarkers {
        /// Second field of the line.
        data: String,
        /// Third field of the line.
        recurrence: String,
    },
    /// A line that appears before the first gateway header.
    #[error("line precedes the first gateway header")]
    OutsideGateway,
}

/// A plan line that was left out of track parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLine {
    /// 1-based line number in the source text.
    pub line_number: usize,
    /// The trimmed line content.
    pub line: String,
    /// Why the line was skipped.
    pub reason: LineError,
}

impl SkippedLine {
    /// Creates a skipped-line diagnostic.
    pub fn new(line_number: usize, line: impl Into<String>, reason: LineError) -> Self {
        Self {
            line_number,
            line: line.into(),
            reason,
        }
    }
}

/// Logs the lines an operation left out, once per line.
///
/// Only public entry points call this, so a line surfacing through nested
/// steps is reported a single time.
pub(crate) fn log_skipped(operation: &'static str, skipped: &[SkippedLine]) {
    for entry in skipped {
        tracing::warn!(
            operation,
            line_number = entry.line_number,
            line = %entry.line,
            reason = %entry.reason,
            "skipping plan line"
        );
    }
}

/// A parsed value together with the lines skipped while producing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseOutcome<T> {
    /// The parsed value.
    pub value: T,
    /// Lines left out, in source order.
    pub skipped: Vec<SkippedLine>,
}

impl<T> ParseOutcome<T> {
    /// Wraps a value with its diagnostics.
    pub fn new(value: T, skipped: Vec<SkippedLine>) -> Self {
        Self { value, skipped }
    }

    /// Whether every line was used.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Maps the value, keeping the diagnostics.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ParseOutcome<U> {
        ParseOutcome {
            value: f(self.value),
            skipped: self.skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let e = TrackError::NoGateway {
            marker: "GS_".into(),
        };
        assert_eq!(
            e.to_string(),
            "no gateway entries found (lines starting with 'GS_')"
        );
        assert_eq!(
            TrackError::format("too short").to_string(),
            "invalid format: too short"
        );
    }

    #[test]
    fn test_line_error_messages() {
        assert_eq!(
            LineError::TooFewFields { found: 2 }.to_string(),
            "expected at least 5 fields, found 2"
        );
        assert_eq!(
            LineError::BadTimestamp {
                value: "2024".into()
            }
            .to_string(),
            "invalid timestamp '2024'"
        );
    }

    #[test]
    fn test_parse_outcome_map() {
        let outcome = ParseOutcome::new(2, vec![]);
        assert!(outcome.is_clean());
        let mapped = outcome.map(|v| v * 10);
        assert_eq!(mapped.value, 20);
    }
}
