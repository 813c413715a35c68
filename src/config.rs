//! Engine configuration.
//!
//! Thresholds and format markers used by the parsers, the expansion step
//! and the analyzer. Defaults reproduce the production plan format; every
//! field can be overridden from JSON.
//!
//! # Example
//!
//! ```
//! use u_trackplan::EngineConfig;
//!
//! let config = EngineConfig::default().with_duration_limits(20.0, 50.0);
//! assert!(config.validate().is_ok());
//! assert_eq!(config.gateway_marker, "GS_");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackError};
use crate::models::{DEFAULT_DATA_MARKER, DEFAULT_RECURRENCE_MARKER};

/// Configuration shared by all engine operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Tracks shorter than this (minutes) are flagged `SHORT`.
    pub short_track_minutes: f64,
    /// Tracks longer than this (minutes) are flagged `LONG`.
    pub long_track_minutes: f64,
    /// Total XML duration (minutes) below which the schedule is a repeating
    /// pattern that must be expanded.
    pub expansion_threshold_minutes: f64,
    /// Length of one repeating XML pattern (hours).
    pub pattern_period_hours: i64,
    /// Number of phase copies produced by expansion.
    pub pattern_repeats: u32,
    /// Vendor prefix stripped from XML satellite names.
    pub vendor_prefix: String,
    /// Prefix that identifies a gateway header line.
    pub gateway_marker: String,
    /// Expected second field of a track line.
    pub data_marker: String,
    /// Expected third field of a track line.
    pub recurrence_marker: String,
    /// A schedule whose first-to-last start span exceeds this (hours)
    /// overflows the deploy day.
    pub overflow_span_hours: f64,
    /// Lifetime of a stored download artifact (seconds).
    pub artifact_ttl_secs: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            short_track_minutes: 24.0,
            long_track_minutes: 45.0,
            expansion_threshold_minutes: 420.0,
            pattern_period_hours: 6,
            pattern_repeats: 4,
            vendor_prefix: "O3B ".to_string(),
            gateway_marker: "GS_".to_string(),
            data_marker: DEFAULT_DATA_MARKER.to_string(),
            recurrence_marker: DEFAULT_RECURRENCE_MARKER.to_string(),
            overflow_span_hours: 24.0,
            artifact_ttl_secs: 600,
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| TrackError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the SHORT/LONG thresholds (minutes).
    pub fn with_duration_limits(mut self, short_minutes: f64, long_minutes: f64) -> Self {
        self.short_track_minutes = short_minutes;
        self.long_track_minutes = long_minutes;
        self
    }

    /// Sets the gateway header marker.
    pub fn with_gateway_marker(mut self, marker: impl Into<String>) -> Self {
        self.gateway_marker = marker.into();
        self
    }

    /// Sets the vendor prefix stripped from XML satellite names.
    pub fn with_vendor_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.vendor_prefix = prefix.into();
        self
    }

    /// Sets the track line markers.
    pub fn with_markers(mut self, data: impl Into<String>, recurrence: impl Into<String>) -> Self {
        self.data_marker = data.into();
        self.recurrence_marker = recurrence.into();
        self
    }

    /// Sets the artifact lifetime (seconds).
    pub fn with_artifact_ttl(mut self, secs: i64) -> Self {
        self.artifact_ttl_secs = secs;
        self
    }

    /// Checks internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.short_track_minutes.is_nan() || self.short_track_minutes < 0.0 {
            return Err(TrackError::InvalidConfig(
                "short_track_minutes must be non-negative".into(),
            ));
        }
        if self.long_track_minutes.is_nan() || self.long_track_minutes < self.short_track_minutes {
            return Err(TrackError::InvalidConfig(format!(
                "long_track_minutes ({}) must not be below short_track_minutes ({})",
                self.long_track_minutes, self.short_track_minutes
            )));
        }
        if self.pattern_period_hours <= 0 || self.pattern_repeats == 0 {
            return Err(TrackError::InvalidConfig(
                "pattern period and repeat count must be positive".into(),
            ));
        }
        if self.gateway_marker.is_empty() {
            return Err(TrackError::InvalidConfig(
                "gateway_marker must not be empty".into(),
            ));
        }
        if self.data_marker.contains(char::is_whitespace)
            || self.recurrence_marker.contains(char::is_whitespace)
            || self.data_marker.is_empty()
            || self.recurrence_marker.is_empty()
        {
            return Err(TrackError::InvalidConfig(
                "track markers must be single non-empty tokens".into(),
            ));
        }
        if self.artifact_ttl_secs <= 0 {
            return Err(TrackError::InvalidConfig(
                "artifact_ttl_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Whether the two marker fields match the configured markers.
    pub(crate) fn accepts_markers(&self, data: &str, recurrence: &str) -> bool {
        data == self.data_marker && recurrence == self.recurrence_marker
    }
}
