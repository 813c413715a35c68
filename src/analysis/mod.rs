//! Overlap and duration analysis.
//!
//! Turns raw records into a flagged, chronologically ordered [`TrackList`].
//!
//! # Algorithm
//!
//! 1. Group records by gateway (first-seen order); stable-sort each group
//!    by start.
//! 2. Resolve day rollover: a negative `end - start` moves `end` forward by
//!    whole days until the duration is no longer negative.
//! 3. Clear previous flags, then assign `SHORT` (< short threshold) or
//!    `LONG` (> long threshold).
//! 4. Assign `NO_OVERLAP` to a track that touches none of its neighbours
//!    inside the gateway. Touching is inclusive: `start <= prev.end` or
//!    `end >= next.start`. A singleton has no neighbour to check.
//! 5. Merge every gateway into one list, stably ordered by (start, gateway).
//!
//! The result is a fixed point: analyzing an analyzed list reproduces the
//! same order and flags.
//!
//! # Complexity
//! O(n log n) in the number of records.

mod summary;

pub use summary::ScheduleSummary;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::models::{TrackFlag, TrackList, TrackRecord};

/// Output of [`analyze`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Flagged tracks in chronological order.
    pub tracks: TrackList,
    /// Whether the first-to-last start span exceeds the overflow span.
    pub deploy_overflow: bool,
}

impl Analysis {
    /// Summary statistics of the analyzed tracks.
    pub fn summary(&self, config: &EngineConfig) -> ScheduleSummary {
        ScheduleSummary::calculate(&self.tracks, config)
    }
}

/// Duration flag for a track of `minutes`, if any.
pub(crate) fn duration_flag(minutes: f64, config: &EngineConfig) -> Option<TrackFlag> {
    if minutes < config.short_track_minutes {
        Some(TrackFlag::Short)
    } else if minutes > config.long_track_minutes {
        Some(TrackFlag::Long)
    } else {
        None
    }
}

/// Analyzes raw records.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_trackplan::{analyze, EngineConfig, TrackFlag, TrackRecord};
///
/// let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// let t = |h, m| day.and_hms_opt(h, m, 0).unwrap();
/// let raw = vec![
///     TrackRecord::new("S1", t(10, 0), t(10, 30)).with_gateway("GS_A"),
///     TrackRecord::new("S2", t(10, 30), t(11, 0)).with_gateway("GS_A"),
///     TrackRecord::new("S3", t(12, 0), t(12, 30)).with_gateway("GS_A"),
/// ];
///
/// let analysis = analyze(raw, &EngineConfig::default());
/// let flagged: Vec<bool> = analysis
///     .tracks
///     .iter()
///     .map(|r| r.flags.contains(TrackFlag::NoOverlap))
///     .collect();
/// assert_eq!(flagged, vec![false, false, true]);
/// ```
pub fn analyze(raw: Vec<TrackRecord>, config: &EngineConfig) -> Analysis {
    let mut groups: Vec<(String, Vec<TrackRecord>)> = Vec::new();
    for record in raw {
        match groups.iter_mut().find(|(name, _)| *name == record.gateway) {
            Some((_, members)) => members.push(record),
            None => groups.push((record.gateway.clone(), vec![record])),
        }
    }

    let mut tracks = Vec::new();
    for (gateway, mut members) in groups {
        members.sort_by_key(|r| r.start);
        for record in &mut members {
            normalize_rollover(record);
            record.flags.clear();
            if let Some(flag) = duration_flag(record.duration_minutes(), config) {
                record.flags.insert(flag);
            }
        }
        let gaps = mark_gaps(&mut members);
        debug!(gateway = %gateway, tracks = members.len(), gaps, "analyzed gateway");
        tracks.extend(members);
    }

    tracks.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.gateway.cmp(&b.gateway)));
    let tracks = TrackList::from_records(tracks);
    let deploy_overflow = tracks.exceeds_span(config.overflow_span_hours);
    if deploy_overflow {
        debug!(
            span_hours = tracks.time_span_hours(),
            "schedule exceeds overflow span"
        );
    }

    Analysis {
        tracks,
        deploy_overflow,
    }
}

const SECS_PER_DAY: i64 = 86_400;

/// Moves `end` forward by whole days until it is not before `start`.
fn normalize_rollover(record: &mut TrackRecord) {
    if record.end < record.start {
        let deficit = (record.start - record.end).num_seconds();
        let days = (deficit + SECS_PER_DAY - 1) / SECS_PER_DAY;
        record.end += Duration::days(days);
    }
    record.duration_secs = (record.end - record.start).num_seconds();
}

/// Flags isolated tracks of one start-sorted gateway. Returns the count.
fn mark_gaps(members: &mut [TrackRecord]) -> usize {
    let n = members.len();
    if n < 2 {
        return 0;
    }

    let mut isolated = vec![false; n];
    for i in 0..n {
        let current = &members[i];
        let touches_prev = i > 0 && current.start <= members[i - 1].end;
        let touches_next = i + 1 < n && current.end >= members[i + 1].start;
        isolated[i] = !touches_prev && !touches_next;
    }

    let mut count = 0;
    for (record, gap) in members.iter_mut().zip(isolated) {
        if gap {
            record.flags.insert(TrackFlag::NoOverlap);
            count += 1;
        }
    }
    count
}
