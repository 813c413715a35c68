//! Plan document model.
//!
//! A plan is the line-oriented schedule format exchanged with the ground
//! segment:
//!
//! ```text
//! 1710460800000                                       <- epoch (ms)
//! 20240315000000.000                                  <- deploy marker
//! GS_ALPHA                                            <- gateway header
//! SAT1 DAT RECUR 20240315100000.000 20240315103000.000
//! SAT2 DAT RECUR 20240315103000.000 20240315110000.000
//! GS_BETA
//! ...
//! ```
//!
//! Lines inside a gateway block that do not parse as track lines are kept
//! verbatim so a document can be re-emitted without losing content.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::timestamp::{format_compact, parse_compact};
use super::TrackRecord;
use crate::error::LineError;

/// A parsed track line: `satellite data recurrence start end [extra...]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackLine {
    /// First field.
    pub satellite: String,
    /// Second field.
    pub data_marker: String,
    /// Third field.
    pub recurrence_marker: String,
    /// Fourth field.
    pub start: NaiveDateTime,
    /// Fifth field.
    pub end: NaiveDateTime,
    /// Fields after the fifth, kept in order.
    pub extra: Vec<String>,
}

impl TrackLine {
    /// Parses a whitespace-separated track line.
    ///
    /// Markers are not checked here; see [`EngineConfig`](crate::EngineConfig).
    pub fn parse(line: &str) -> Result<Self, LineError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 5 {
            return Err(LineError::TooFewFields {
                found: fields.len(),
            });
        }
        let start = parse_field(fields[3])?;
        let end = parse_field(fields[4])?;
        Ok(Self {
            satellite: fields[0].to_string(),
            data_marker: fields[1].to_string(),
            recurrence_marker: fields[2].to_string(),
            start,
            end,
            extra: fields[5..].iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Builds the line for a record.
    pub fn from_record(record: &TrackRecord) -> Self {
        Self {
            satellite: record.satellite.clone(),
            data_marker: record.data_marker.clone(),
            recurrence_marker: record.recurrence_marker.clone(),
            start: record.start,
            end: record.end,
            extra: Vec::new(),
        }
    }

    /// Converts to an unflagged record of `gateway`.
    pub fn to_record(&self, gateway: &str) -> TrackRecord {
        TrackRecord::new(self.satellite.clone(), self.start, self.end)
            .with_gateway(gateway)
            .with_markers(self.data_marker.clone(), self.recurrence_marker.clone())
    }
}

fn parse_field(value: &str) -> Result<NaiveDateTime, LineError> {
    parse_compact(value).ok_or_else(|| LineError::BadTimestamp {
        value: value.to_string(),
    })
}

impl fmt::Display for TrackLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.satellite,
            self.data_marker,
            self.recurrence_marker,
            format_compact(&self.start),
            format_compact(&self.end)
        )?;
        for field in &self.extra {
            write!(f, " {field}")?;
        }
        Ok(())
    }
}

/// One line inside a gateway block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanLine {
    /// A parsed track line.
    Track(TrackLine),
    /// Any other line, kept verbatim.
    Other(String),
}

impl fmt::Display for PlanLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanLine::Track(track) => fmt::Display::fmt(track, f),
            PlanLine::Other(raw) => f.write_str(raw),
        }
    }
}

/// A gateway header and the lines that follow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayBlock {
    /// Header line (the gateway identifier).
    pub name: String,
    /// Lines until the next header.
    pub lines: Vec<PlanLine>,
}

impl GatewayBlock {
    /// Creates an empty block.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: Vec::new(),
        }
    }

    /// Appends a line.
    pub fn with_line(mut self, line: PlanLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Parsed track lines of this block.
    pub fn tracks(&self) -> impl Iterator<Item = &TrackLine> {
        self.lines.iter().filter_map(|line| match line {
            PlanLine::Track(track) => Some(track),
            PlanLine::Other(_) => None,
        })
    }
}

/// A full plan document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDocument {
    /// Line 1, passed through.
    pub epoch: String,
    /// Line 2, passed through.
    pub deploy_marker: String,
    /// Lines between the deploy marker and the first gateway header, kept
    /// verbatim.
    #[serde(default)]
    pub preamble: Vec<String>,
    /// Gateway blocks in source order.
    pub gateways: Vec<GatewayBlock>,
}

impl PlanDocument {
    /// Creates a document without gateways.
    pub fn new(epoch: impl Into<String>, deploy_marker: impl Into<String>) -> Self {
        Self {
            epoch: epoch.into(),
            deploy_marker: deploy_marker.into(),
            preamble: Vec::new(),
            gateways: Vec::new(),
        }
    }

    /// Appends a gateway block.
    pub fn with_gateway(mut self, block: GatewayBlock) -> Self {
        self.gateways.push(block);
        self
    }

    /// Gateway identifiers in document order.
    pub fn gateway_names(&self) -> Vec<&str> {
        self.gateways.iter().map(|g| g.name.as_str()).collect()
    }

    /// Finds a gateway block by identifier.
    pub fn gateway(&self, name: &str) -> Option<&GatewayBlock> {
        self.gateways.iter().find(|g| g.name == name)
    }

    /// Total number of parsed track lines.
    pub fn track_count(&self) -> usize {
        self.gateways.iter().map(|g| g.tracks().count()).sum()
    }

    /// Raw (unflagged) records of every parsed track line, tagged with
    /// their gateway, in document order.
    pub fn track_records(&self) -> Vec<TrackRecord> {
        self.gateways
            .iter()
            .flat_map(|g| g.tracks().map(move |t| t.to_record(&g.name)))
            .collect()
    }
}
