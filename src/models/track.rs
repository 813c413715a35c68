//! Track record model.
//!
//! A track is one scheduled contact window between a satellite and a
//! gateway. Records are created fresh by the parsers, annotated by the
//! analyzer and discarded after serialization.

use std::fmt;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;

/// An anomaly detected on a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrackFlag {
    /// Duration below the short threshold.
    Short,
    /// Duration above the long threshold.
    Long,
    /// Gap against the previous or next track of the same gateway.
    NoOverlap,
}

impl TrackFlag {
    /// All flags, in display order.
    pub const ALL: [TrackFlag; 3] = [TrackFlag::Short, TrackFlag::Long, TrackFlag::NoOverlap];

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            TrackFlag::Short => "SHORT",
            TrackFlag::Long => "LONG",
            TrackFlag::NoOverlap => "NO OVERLAP",
        }
    }

    fn bit(self) -> u8 {
        match self {
            TrackFlag::Short => 0b001,
            TrackFlag::Long => 0b010,
            TrackFlag::NoOverlap => 0b100,
        }
    }
}

impl fmt::Display for TrackFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Set of [`TrackFlag`]s. Empty renders as `OK`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<TrackFlag>", into = "Vec<TrackFlag>")]
pub struct FlagSet {
    bits: u8,
}

impl FlagSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a flag. Returns `false` if it was already present.
    pub fn insert(&mut self, flag: TrackFlag) -> bool {
        let present = self.contains(flag);
        self.bits |= flag.bit();
        !present
    }

    /// Whether the flag is present.
    #[inline]
    pub fn contains(&self, flag: TrackFlag) -> bool {
        self.bits & flag.bit() != 0
    }

    /// Whether no flag is set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Removes every flag.
    pub fn clear(&mut self) {
        self.bits = 0;
    }

    /// Flags present, in display order.
    pub fn iter(&self) -> impl Iterator<Item = TrackFlag> {
        let set = *self;
        TrackFlag::ALL.into_iter().filter(move |f| set.contains(*f))
    }

    /// Number of flags present.
    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }
}

impl From<Vec<TrackFlag>> for FlagSet {
    fn from(flags: Vec<TrackFlag>) -> Self {
        flags.into_iter().collect()
    }
}

impl From<FlagSet> for Vec<TrackFlag> {
    fn from(set: FlagSet) -> Self {
        set.iter().collect()
    }
}

impl FromIterator<TrackFlag> for FlagSet {
    fn from_iter<I: IntoIterator<Item = TrackFlag>>(iter: I) -> Self {
        let mut set = FlagSet::new();
        for flag in iter {
            set.insert(flag);
        }
        set
    }
}

impl fmt::Display for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("OK");
        }
        for (i, flag) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(flag.label())?;
        }
        Ok(())
    }
}

/// Default second field of a track line.
pub const DEFAULT_DATA_MARKER: &str = "DAT";

/// Default third field of a track line.
pub const DEFAULT_RECURRENCE_MARKER: &str = "RECUR";

/// One contact window between a satellite and a gateway.
///
/// # Time Representation
/// `start` and `end` are naive timestamps with second resolution. The
/// duration is kept in whole seconds and exposed in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    /// Gateway identifier. Empty until assigned (XML input).
    pub gateway: String,
    /// Satellite identifier.
    pub satellite: String,
    /// Second field of a plan track line.
    pub data_marker: String,
    /// Third field of a plan track line.
    pub recurrence_marker: String,
    /// Window start.
    pub start: NaiveDateTime,
    /// Window end.
    pub end: NaiveDateTime,
    /// `end - start` in seconds.
    pub duration_secs: i64,
    /// Detected anomalies.
    pub flags: FlagSet,
}

impl TrackRecord {
    /// Creates an unassigned, unflagged record.
    ///
    /// Markers are [`DEFAULT_DATA_MARKER`] and [`DEFAULT_RECURRENCE_MARKER`];
    /// use [`with_config_markers`](Self::with_config_markers) when the
    /// engine runs with custom markers.
    pub fn new(satellite: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            gateway: String::new(),
            satellite: satellite.into(),
            data_marker: DEFAULT_DATA_MARKER.to_string(),
            recurrence_marker: DEFAULT_RECURRENCE_MARKER.to_string(),
            start,
            end,
            duration_secs: (end - start).num_seconds(),
            flags: FlagSet::new(),
        }
    }

    /// Sets the gateway.
    pub fn with_gateway(mut self, gateway: impl Into<String>) -> Self {
        self.gateway = gateway.into();
        self
    }

    /// Sets the data and recurrence markers.
    pub fn with_markers(mut self, data: impl Into<String>, recurrence: impl Into<String>) -> Self {
        self.data_marker = data.into();
        self.recurrence_marker = recurrence.into();
        self
    }

    /// Sets the markers configured in `config`.
    pub fn with_config_markers(self, config: &EngineConfig) -> Self {
        self.with_markers(config.data_marker.as_str(), config.recurrence_marker.as_str())
    }

    /// Duration in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> f64 {
        self.duration_secs as f64 / 60.0
    }

    /// Duration as a `chrono` value.
    #[inline]
    pub fn duration(&self) -> Duration {
        Duration::seconds(self.duration_secs)
    }

    /// Moves the window so it starts at `start`, keeping its duration.
    pub fn reanchor(&mut self, start: NaiveDateTime) {
        self.start = start;
        self.end = start + self.duration();
    }

    /// Whether any anomaly was detected.
    #[inline]
    pub fn is_flagged(&self) -> bool {
        !self.flags.is_empty()
    }

    /// Flag column text (`OK` or comma-joined labels).
    pub fn flag_label(&self) -> String {
        self.flags.to_string()
    }
}
