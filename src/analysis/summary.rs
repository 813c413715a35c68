//! Schedule summary statistics.
//!
//! | Statistic | Definition |
//! |-----------|-----------|
//! | Time span | Hours from the earliest to the latest start |
//! | Short | Tracks flagged `SHORT` |
//! | Long | Tracks flagged `LONG` |
//! | No overlap | Tracks with no contiguous neighbour in their gateway |
//! | Flagged | Tracks carrying any flag |
//! | Exceeds day | Time span above the overflow span (24 h) |

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::models::{TrackFlag, TrackList};

/// Summary statistics of an analyzed track list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    /// Number of tracks.
    pub track_count: usize,
    /// First-to-last start span in hours.
    pub time_span_hours: f64,
    /// Tracks flagged `SHORT`.
    pub short_count: usize,
    /// Tracks flagged `LONG`.
    pub long_count: usize,
    /// Tracks flagged `NO_OVERLAP`.
    pub no_overlap_count: usize,
    /// Tracks carrying any flag.
    pub flagged_count: usize,
    /// Track count per gateway.
    pub tracks_by_gateway: BTreeMap<String, usize>,
    /// Whether the time span exceeds the overflow span.
    pub exceeds_day: bool,
    /// Short threshold used for the labels (minutes).
    pub short_threshold_minutes: f64,
    /// Long threshold used for the labels (minutes).
    pub long_threshold_minutes: f64,
}

impl ScheduleSummary {
    /// Computes the summary of `tracks`.
    ///
    /// Flags are read as stored; run [`analyze`](crate::analyze) first.
    pub fn calculate(tracks: &TrackList, config: &EngineConfig) -> Self {
        let mut tracks_by_gateway = BTreeMap::new();
        for record in tracks {
            *tracks_by_gateway.entry(record.gateway.clone()).or_insert(0) += 1;
        }

        Self {
            track_count: tracks.len(),
            time_span_hours: tracks.time_span_hours(),
            short_count: tracks.count_flag(TrackFlag::Short),
            long_count: tracks.count_flag(TrackFlag::Long),
            no_overlap_count: tracks.count_flag(TrackFlag::NoOverlap),
            flagged_count: tracks.flagged_count(),
            tracks_by_gateway,
            exceeds_day: tracks.exceeds_span(config.overflow_span_hours),
            short_threshold_minutes: config.short_track_minutes,
            long_threshold_minutes: config.long_track_minutes,
        }
    }

    /// Whether every track is unflagged.
    pub fn is_clean(&self) -> bool {
        self.flagged_count == 0
    }
}

impl fmt::Display for ScheduleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary:")?;
        writeln!(f, "Total tracks: {}", self.track_count)?;
        writeln!(
            f,
            "Time span (first to last start): {:.2} hours",
            self.time_span_hours
        )?;
        writeln!(
            f,
            "Short tracks (under {} mins): {}",
            self.short_threshold_minutes, self.short_count
        )?;
        writeln!(
            f,
            "Long tracks (over {} mins): {}",
            self.long_threshold_minutes, self.long_count
        )?;
        writeln!(
            f,
            "No Overlap (no satellite connected to the gateway): {}",
            self.no_overlap_count
        )?;
        writeln!(f, "Tracks flagged: {}", self.flagged_count)?;
        if self.tracks_by_gateway.len() > 1 {
            for (gateway, count) in &self.tracks_by_gateway {
                writeln!(f, "  {gateway}: {count}")?;
            }
        }
        if self.exceeds_day {
            write!(f, "WARNING: schedule exceeds 24-hour period")
        } else {
            write!(f, "Schedule fits within a 24-hour period")
        }
    }
}
