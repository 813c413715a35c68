//! Plan date rewriting.
//!
//! Moves every track line of a plan onto a new deploy date while keeping
//! each window's time-of-day.
//!
//! # Rollover Rule
//!
//! A window whose end time-of-day is earlier than its start time-of-day
//! crossed midnight: its end lands on `new_date + 1 day`. Every other window
//! starts and ends on `new_date`.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{log_skipped, Result, SkippedLine, TrackError};
use crate::models::timestamp::{epoch_millis, format_compact};
use crate::models::TrackLine;
use crate::parser::plan::non_blank_lines;
use crate::serialize::push_line;

/// Re-dates a track line onto `date` with the rollover rule.
pub fn redate(track: &TrackLine, date: NaiveDate) -> TrackLine {
    let start_tod = track.start.time();
    let end_tod = track.end.time();
    let end_date = if end_tod < start_tod {
        date + Duration::days(1)
    } else {
        date
    };
    TrackLine {
        start: date.and_time(start_tod),
        end: end_date.and_time(end_tod),
        ..track.clone()
    }
}

/// Result of [`rewrite_dates`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteOutcome {
    /// Rewritten plan text.
    pub content: String,
    /// New epoch (ms of the earliest rewritten start).
    pub epoch_ms: i64,
    /// Number of track lines rewritten.
    pub rewritten: usize,
    /// Lines passed through without a rewrite (headers excluded).
    pub skipped: Vec<SkippedLine>,
}

/// Rewrites a plan onto a new deploy date and time.
///
/// Lines after the deploy marker that parse as track lines are re-dated;
/// the data and recurrence markers are not checked. Gateway headers pass
/// through silently, other unparseable lines pass through with a
/// diagnostic. Blank lines are dropped.
///
/// # Errors
/// - [`TrackError::Format`] if fewer than 3 non-blank lines exist.
/// - [`TrackError::Validation`] if no track line could be rewritten.
///
/// # Example
///
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use u_trackplan::{rewrite_dates, EngineConfig};
///
/// let plan = "0\n20240315000000.000\nGS_A\nS1 DAT RECUR 20240315235000.000 20240316001000.000\n";
/// let date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
/// let time = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
///
/// let out = rewrite_dates(plan, date, time, &EngineConfig::default()).unwrap();
/// assert!(out.content.ends_with("S1 DAT RECUR 20240401235000.000 20240402001000.000\n"));
/// ```
pub fn rewrite_dates(
    content: &str,
    new_date: NaiveDate,
    new_time: NaiveTime,
    config: &EngineConfig,
) -> Result<RewriteOutcome> {
    let outcome = rewrite_text(content, new_date, new_time, config)?;
    log_skipped("rewrite_dates", &outcome.skipped);
    Ok(outcome)
}

/// [`rewrite_dates`] without logging the skipped lines.
pub(crate) fn rewrite_text(
    content: &str,
    new_date: NaiveDate,
    new_time: NaiveTime,
    config: &EngineConfig,
) -> Result<RewriteOutcome> {
    let lines = non_blank_lines(content);
    if lines.len() < 3 {
        return Err(TrackError::format(
            "file too short - needs at least 3 lines (epoch, deploy time, and one gateway)",
        ));
    }

    let mut body = Vec::with_capacity(lines.len() - 2);
    let mut skipped = Vec::new();
    let mut earliest: Option<NaiveDateTime> = None;
    let mut rewritten = 0;

    for line in &lines[2..] {
        if line.text.starts_with(&config.gateway_marker) {
            body.push(line.text.to_string());
            continue;
        }
        match TrackLine::parse(line.text) {
            Ok(track) => {
                let moved = redate(&track, new_date);
                earliest = Some(earliest.map_or(moved.start, |e| e.min(moved.start)));
                body.push(moved.to_string());
                rewritten += 1;
            }
            Err(reason) => {
                skipped.push(SkippedLine::new(line.number, line.text, reason));
                body.push(line.text.to_string());
            }
        }
    }

    let earliest = earliest
        .ok_or_else(|| TrackError::validation("no valid tracks found to calculate epoch"))?;
    let epoch_ms = epoch_millis(&earliest);

    let mut out = String::new();
    push_line(&mut out, &epoch_ms.to_string());
    push_line(&mut out, &format_compact(&new_date.and_time(new_time)));
    for line in &body {
        push_line(&mut out, line);
    }

    debug!(rewritten, skipped = skipped.len(), epoch_ms, "rewrote plan dates");
    Ok(RewriteOutcome {
        content: out,
        epoch_ms,
        rewritten,
        skipped,
    })
}
