//! Plan text rendering.
//!
//! Every emitted line ends with `\n`. Timestamps are written as
//! `YYYYMMDDHHMMSS.000`.

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use crate::error::{Result, TrackError};
use crate::models::timestamp::{epoch_millis, format_compact};
use crate::models::{PlanDocument, TrackLine, TrackRecord};

pub(crate) fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

/// Renders one gateway's tracks as a plan.
///
/// Line 1 is the epoch of the first record's start, line 2 the deploy date
/// and time, line 3 the gateway name, then one track line per record in the
/// given order.
///
/// # Errors
/// [`TrackError::Validation`] if `tracks` is empty.
///
/// # Example
///
/// ```
/// use chrono::{NaiveDate, NaiveTime};
/// use u_trackplan::{serialize, TrackRecord};
///
/// let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// let record = TrackRecord::new("FM01", day.and_hms_opt(0, 0, 0).unwrap(), day.and_hms_opt(0, 30, 0).unwrap());
/// let text = serialize(&[record], "GS_A", day, NaiveTime::from_hms_opt(8, 0, 0).unwrap()).unwrap();
/// assert_eq!(
///     text,
///     "1710460800000\n20240315080000.000\nGS_A\nFM01 DAT RECUR 20240315000000.000 20240315003000.000\n"
/// );
/// ```
pub fn serialize(
    tracks: &[TrackRecord],
    gateway_name: &str,
    deploy_date: NaiveDate,
    deploy_time: NaiveTime,
) -> Result<String> {
    let first = tracks
        .first()
        .ok_or_else(|| TrackError::validation("no tracks to serialize"))?;

    let mut out = String::new();
    push_line(&mut out, &epoch_millis(&first.start).to_string());
    push_line(&mut out, &format_compact(&deploy_date.and_time(deploy_time)));
    push_line(&mut out, gateway_name);
    for record in tracks {
        push_line(&mut out, &TrackLine::from_record(record).to_string());
    }

    debug!(gateway = gateway_name, tracks = tracks.len(), "serialized plan");
    Ok(out)
}

/// Renders a plan document.
///
/// Track lines are normalized (single spaces, `.000` fractions); preamble
/// and unparsed lines are written verbatim.
pub fn serialize_plan(document: &PlanDocument) -> String {
    let mut out = String::new();
    push_line(&mut out, &document.epoch);
    push_line(&mut out, &document.deploy_marker);
    for line in &document.preamble {
        push_line(&mut out, line);
    }
    for gateway in &document.gateways {
        push_line(&mut out, &gateway.name);
        for line in &gateway.lines {
            push_line(&mut out, &line.to_string());
        }
    }
    out
}
