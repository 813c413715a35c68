//! Vendor XML schedule parser.
//!
//! The vendor exports one repeating 6-hour contact pattern:
//!
//! ```xml
//! <Schedule>
//!   <Track Satellite="O3B FM01" StartTime="03/15/2024 00:10:00" EndTime="03/15/2024 00:40:00"/>
//!   <Track Satellite="O3B FM02" StartTime="03/15/2024 00:40:00" EndTime="03/15/2024 01:10:00"/>
//! </Schedule>
//! ```
//!
//! [`read_tracks`] returns the raw pattern; [`parse_xml`] also expands it to
//! a full day anchored on the deploy date.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::analysis::duration_flag;
use crate::config::EngineConfig;
use crate::error::{Result, TrackError};
use crate::expansion::expand_and_align;
use crate::models::timestamp::parse_xml_timestamp;
use crate::models::TrackRecord;

#[derive(Debug, Deserialize)]
struct XmlSchedule {
    #[serde(rename = "Track", default)]
    tracks: Vec<XmlTrack>,
}

#[derive(Debug, Deserialize)]
struct XmlTrack {
    #[serde(rename = "@Satellite", default)]
    satellite: String,
    #[serde(rename = "@StartTime")]
    start_time: String,
    #[serde(rename = "@EndTime")]
    end_time: String,
}

/// Reads the raw track pattern from a vendor XML document.
///
/// Records carry the configured markers, their duration and duration flag.
/// Their gateway is left empty.
///
/// # Errors
/// - [`TrackError::Format`] for malformed XML, missing attributes or
///   unparseable timestamps.
/// - [`TrackError::NoData`] if the document has no `Track` element.
pub fn read_tracks(content: &str, config: &EngineConfig) -> Result<Vec<TrackRecord>> {
    let schedule: XmlSchedule = quick_xml::de::from_str(content)
        .map_err(|e| TrackError::format(format!("invalid XML file format: {e}")))?;

    if schedule.tracks.is_empty() {
        return Err(TrackError::no_data("no valid Track elements found in XML"));
    }

    let mut records = Vec::with_capacity(schedule.tracks.len());
    for track in schedule.tracks {
        let start = parse_xml_timestamp(&track.start_time).ok_or_else(|| {
            TrackError::format(format!("invalid StartTime '{}'", track.start_time))
        })?;
        let end = parse_xml_timestamp(&track.end_time).ok_or_else(|| {
            TrackError::format(format!("invalid EndTime '{}'", track.end_time))
        })?;
        let satellite = track.satellite.replace(&config.vendor_prefix, "");

        let mut record = TrackRecord::new(satellite, start, end).with_config_markers(config);
        if let Some(flag) = duration_flag(record.duration_minutes(), config) {
            record.flags.insert(flag);
        }
        records.push(record);
    }

    debug!(tracks = records.len(), "read XML pattern");
    Ok(records)
}

/// Parses a vendor XML document into a full day of records anchored on
/// `deploy_date`.
///
/// See [`expand_and_align`] for the expansion rules.
pub fn parse_xml(
    content: &str,
    deploy_date: NaiveDate,
    config: &EngineConfig,
) -> Result<Vec<TrackRecord>> {
    let raw = read_tracks(content, config)?;
    Ok(expand_and_align(raw, deploy_date, config))
}
