//! Expansion of a repeating XML pattern into a 24-hour timeline.
//!
//! # Algorithm
//!
//! 1. If the total raw duration is below the expansion threshold (420 min),
//!    the input is one repeating pattern: emit `pattern_repeats` copies
//!    offset by `0, period, 2*period, ...` hours. Each copy keeps the
//!    original time-of-day and its day offset from the earliest record,
//!    re-based onto the deploy date.
//! 2. Order records by (time-of-day, calendar date) with a stable sort, so
//!    copies landing on the same time-of-day keep a deterministic order.
//! 3. Re-anchor every record onto the deploy date using only its
//!    time-of-day. `end` is recomputed as `start + duration`.
//!
//! # Complexity
//! O(n log n) in the number of produced records.

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::config::EngineConfig;
use crate::models::TrackRecord;

/// Expands (if needed) and re-anchors records onto `deploy_date`.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_trackplan::{expand_and_align, EngineConfig, TrackRecord};
///
/// let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// let start = day.and_hms_opt(1, 0, 0).unwrap();
/// let end = day.and_hms_opt(1, 30, 0).unwrap();
/// let deploy = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
///
/// let out = expand_and_align(vec![TrackRecord::new("FM01", start, end)], deploy, &EngineConfig::default());
/// assert_eq!(out.len(), 4);
/// assert_eq!(out[3].start, deploy.and_hms_opt(19, 0, 0).unwrap());
/// ```
pub fn expand_and_align(
    records: Vec<TrackRecord>,
    deploy_date: NaiveDate,
    config: &EngineConfig,
) -> Vec<TrackRecord> {
    let Some(earliest) = records.iter().map(|r| r.start.date()).min() else {
        return records;
    };

    let total_minutes: f64 = records.iter().map(|r| r.duration_minutes()).sum();
    let mut timeline = if total_minutes < config.expansion_threshold_minutes {
        debug!(
            total_minutes,
            repeats = config.pattern_repeats,
            "expanding repeating pattern"
        );
        repeat_pattern(&records, earliest, deploy_date, config)
    } else {
        records
    };

    timeline.sort_by_key(|r| (r.start.time(), r.start.date()));
    for record in &mut timeline {
        record.reanchor(deploy_date.and_time(record.start.time()));
    }
    timeline
}

fn repeat_pattern(
    records: &[TrackRecord],
    earliest: NaiveDate,
    deploy_date: NaiveDate,
    config: &EngineConfig,
) -> Vec<TrackRecord> {
    let mut out = Vec::with_capacity(records.len() * config.pattern_repeats as usize);
    for phase in 0..config.pattern_repeats {
        let shift = Duration::hours(config.pattern_period_hours * i64::from(phase));
        for record in records {
            let day_offset = (record.start.date() - earliest).num_days();
            let base = deploy_date + Duration::days(day_offset);
            let mut copy = record.clone();
            copy.reanchor(base.and_time(record.start.time()) + shift);
            out.push(copy);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn on(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn deploy() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
    }

    #[test]
    fn test_expands_four_times() {
        let records = vec![
            TrackRecord::new("A", on(15, 0, 0), on(15, 0, 30)),
            TrackRecord::new("B", on(15, 0, 30), on(15, 1, 0)),
        ];
        let out = expand_and_align(records, deploy(), &EngineConfig::default());
        assert_eq!(out.len(), 8);

        let starts: Vec<_> = out.iter().map(|r| r.start.format("%H:%M").to_string()).collect();
        assert_eq!(
            starts,
            vec!["00:00", "00:30", "06:00", "06:30", "12:00", "12:30", "18:00", "18:30"]
        );
        assert!(out.iter().all(|r| r.duration_secs == 1800));
        assert!(out.iter().all(|r| r.start.date() == deploy()));
    }

    #[test]
    fn test_full_day_not_expanded() {
        // 8 x 60 min = 480 min >= 420
        let records: Vec<_> = (0..8)
            .map(|i| TrackRecord::new(format!("S{i}"), on(15, i * 3, 0), on(15, i * 3 + 1, 0)))
            .collect();
        let out = expand_and_align(records, deploy(), &EngineConfig::default());
        assert_eq!(out.len(), 8);
        assert_eq!(out[0].start, deploy().and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(out[7].start, deploy().and_hms_opt(21, 0, 0).unwrap());
    }

    #[test]
    fn test_day_offset_preserved_then_folded() {
        // Pattern straddling midnight: 23:00 on day 15, 01:00 on day 16.
        let records = vec![
            TrackRecord::new("A", on(15, 23, 0), on(15, 23, 30)),
            TrackRecord::new("B", on(16, 1, 0), on(16, 1, 30)),
        ];
        let out = expand_and_align(records, deploy(), &EngineConfig::default());
        assert_eq!(out.len(), 8);
        // Phase 6h of A lands at 05:00 (next day before folding); all
        // records end up on the deploy date ordered by time-of-day.
        let starts: Vec<_> = out.iter().map(|r| r.start.format("%H:%M").to_string()).collect();
        assert_eq!(
            starts,
            vec!["01:00", "05:00", "07:00", "11:00", "13:00", "17:00", "19:00", "23:00"]
        );
        assert!(out.iter().all(|r| r.start.date() == deploy()));
    }

    #[test]
    fn test_tie_broken_by_calendar_date() {
        // B (00:00, phase 18h) lands on day 0 at 18:00; A (18:00, phase 0)
        // lands on day 1 at 18:00. Earlier calendar date sorts first.
        let records = vec![
            TrackRecord::new("B", on(15, 0, 0), on(15, 0, 10)),
            TrackRecord::new("A", on(16, 18, 0), on(16, 18, 10)),
        ];
        let out = expand_and_align(records, deploy(), &EngineConfig::default());
        let at_18: Vec<_> = out
            .iter()
            .filter(|r| r.start.format("%H:%M").to_string() == "18:00")
            .map(|r| r.satellite.as_str())
            .collect();
        assert_eq!(at_18, vec!["B", "A"]);
    }

    #[test]
    fn test_end_recomputed_across_midnight() {
        let records = vec![TrackRecord::new("A", on(15, 23, 50), on(16, 0, 20))];
        let out = expand_and_align(records, deploy(), &EngineConfig::default());
        let late = out.iter().find(|r| r.start.format("%H:%M").to_string() == "23:50").unwrap();
        assert_eq!(late.end, NaiveDate::from_ymd_opt(2024, 4, 2).unwrap().and_hms_opt(0, 20, 0).unwrap());
    }

    #[test]
    fn test_empty_input() {
        assert!(expand_and_align(Vec::new(), deploy(), &EngineConfig::default()).is_empty());
    }
}
