//! Ordered track list (analysis output).
//!
//! The list the analyzer produces: every gateway's tracks merged into one
//! chronological sequence. Gateway grouping is recoverable through the
//! query helpers but is not reflected in the order.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{TrackFlag, TrackRecord};

/// A chronologically ordered list of tracks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackList {
    /// Tracks in list order.
    pub tracks: Vec<TrackRecord>,
}

impl TrackList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps existing records without reordering them.
    pub fn from_records(tracks: Vec<TrackRecord>) -> Self {
        Self { tracks }
    }

    /// Number of tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Iterates tracks in list order.
    pub fn iter(&self) -> std::slice::Iter<'_, TrackRecord> {
        self.tracks.iter()
    }

    /// Unwraps the records.
    pub fn into_records(self) -> Vec<TrackRecord> {
        self.tracks
    }

    /// Gateway identifiers in order of first appearance.
    pub fn gateways(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for t in &self.tracks {
            if !seen.contains(&t.gateway.as_str()) {
                seen.push(&t.gateway);
            }
        }
        seen
    }

    /// Tracks belonging to a gateway, in list order.
    pub fn for_gateway(&self, gateway: &str) -> Vec<&TrackRecord> {
        self.tracks.iter().filter(|t| t.gateway == gateway).collect()
    }

    /// Tracks for a satellite, in list order.
    pub fn for_satellite(&self, satellite: &str) -> Vec<&TrackRecord> {
        self.tracks
            .iter()
            .filter(|t| t.satellite == satellite)
            .collect()
    }

    /// Earliest start.
    pub fn first_start(&self) -> Option<NaiveDateTime> {
        self.tracks.iter().map(|t| t.start).min()
    }

    /// Latest start.
    pub fn last_start(&self) -> Option<NaiveDateTime> {
        self.tracks.iter().map(|t| t.start).max()
    }

    /// Hours between the earliest and latest start (0 when empty).
    pub fn time_span_hours(&self) -> f64 {
        match (self.first_start(), self.last_start()) {
            (Some(first), Some(last)) => (last - first).num_seconds() as f64 / 3600.0,
            _ => 0.0,
        }
    }

    /// Whether the first-to-last start span exceeds `limit_hours`.
    pub fn exceeds_span(&self, limit_hours: f64) -> bool {
        self.time_span_hours() > limit_hours
    }

    /// Number of tracks carrying `flag`.
    pub fn count_flag(&self, flag: TrackFlag) -> usize {
        self.tracks.iter().filter(|t| t.flags.contains(flag)).count()
    }

    /// Number of tracks carrying any flag.
    pub fn flagged_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_flagged()).count()
    }
}

impl<'a> IntoIterator for &'a TrackList {
    type Item = &'a TrackRecord;
    type IntoIter = std::slice::Iter<'a, TrackRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    fn sample() -> TrackList {
        let mut a = TrackRecord::new("S1", at(15, 10, 0), at(15, 10, 20)).with_gateway("GS_A");
        a.flags.insert(TrackFlag::Short);
        let b = TrackRecord::new("S2", at(15, 11, 0), at(15, 11, 30)).with_gateway("GS_B");
        let mut c = TrackRecord::new("S1", at(16, 12, 0), at(16, 13, 0)).with_gateway("GS_A");
        c.flags.insert(TrackFlag::Long);
        c.flags.insert(TrackFlag::NoOverlap);
        TrackList::from_records(vec![a, b, c])
    }

    #[test]
    fn test_gateways_first_seen_order() {
        let list = sample();
        assert_eq!(list.gateways(), vec!["GS_A", "GS_B"]);
        assert_eq!(list.for_gateway("GS_A").len(), 2);
        assert_eq!(list.for_satellite("S2").len(), 1);
    }

    #[test]
    fn test_time_span() {
        let list = sample();
        assert!((list.time_span_hours() - 26.0).abs() < 1e-10);
        assert!(list.exceeds_span(24.0));
        assert!(!list.exceeds_span(26.0));
    }

    #[test]
    fn test_flag_counts() {
        let list = sample();
        assert_eq!(list.count_flag(TrackFlag::Short), 1);
        assert_eq!(list.count_flag(TrackFlag::Long), 1);
        assert_eq!(list.count_flag(TrackFlag::NoOverlap), 1);
        assert_eq!(list.flagged_count(), 2);
    }

    #[test]
    fn test_empty() {
        let list = TrackList::new();
        assert!(list.is_empty());
        assert_eq!(list.time_span_hours(), 0.0);
        assert!(list.first_start().is_none());
    }
}
