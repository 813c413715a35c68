//! End-to-end analysis entry points.
//!
//! Each function runs one complete request: parse, (expand), analyze and
//! render. Callers never combine the lower-level steps themselves, so the
//! XML and plan paths share one analyzer.
//!
//! | Entry point | Steps |
//! |-------------|-------|
//! | [`analyze_xml`] | parse XML → expand → tag gateway → analyze → serialize |
//! | [`analyze_plan`] | (rewrite dates) → parse plan → analyze |
//!
//! Merging has no analysis step; see [`merge_plans`](crate::merge_plans).

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::{analyze, ScheduleSummary};
use crate::config::EngineConfig;
use crate::error::{log_skipped, Result, SkippedLine, TrackError};
use crate::models::TrackList;
use crate::parser::parse_xml;
use crate::parser::plan::parse_document;
use crate::rewrite::{rewrite_text, RewriteOutcome};
use crate::serialize::serialize;

/// Parameters of an XML analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlRequest {
    /// Gateway the XML schedule belongs to.
    pub gateway: String,
    /// Calendar day every track is anchored on.
    pub deploy_date: NaiveDate,
    /// Deploy time written to the generated plan.
    pub deploy_time: NaiveTime,
}

impl XmlRequest {
    /// Creates a request.
    pub fn new(gateway: impl Into<String>, deploy_date: NaiveDate, deploy_time: NaiveTime) -> Self {
        Self {
            gateway: gateway.into(),
            deploy_date,
            deploy_time,
        }
    }
}

/// Result of [`analyze_xml`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XmlReport {
    /// Flagged tracks in chronological order.
    pub tracks: TrackList,
    /// Summary statistics.
    pub summary: ScheduleSummary,
    /// Generated single-gateway plan.
    pub plan_text: String,
}

/// Analyzes a vendor XML schedule and generates its plan.
///
/// # Errors
/// - [`TrackError::Validation`] if the gateway name is blank.
/// - Any error of [`parse_xml`].
pub fn analyze_xml(content: &str, request: &XmlRequest, config: &EngineConfig) -> Result<XmlReport> {
    let gateway = request.gateway.trim();
    if gateway.is_empty() {
        return Err(TrackError::validation("gateway name is required"));
    }

    let mut records = parse_xml(content, request.deploy_date, config)?;
    for record in &mut records {
        record.gateway = gateway.to_string();
    }

    let analysis = analyze(records, config);
    let summary = analysis.summary(config);
    let plan_text = serialize(
        &analysis.tracks.tracks,
        gateway,
        request.deploy_date,
        request.deploy_time,
    )?;

    debug!(gateway, tracks = summary.track_count, flagged = summary.flagged_count, "analyzed XML schedule");
    Ok(XmlReport {
        tracks: analysis.tracks,
        summary,
        plan_text,
    })
}

/// New deploy date and time for a plan rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployAnchor {
    /// New deploy date.
    pub date: NaiveDate,
    /// New deploy time.
    pub time: NaiveTime,
}

/// Options of [`analyze_plan`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanOptions {
    /// Rewrite the plan onto this anchor before analyzing it.
    pub rewrite: Option<DeployAnchor>,
}

impl PlanOptions {
    /// Requests a date rewrite.
    pub fn with_rewrite(mut self, date: NaiveDate, time: NaiveTime) -> Self {
        self.rewrite = Some(DeployAnchor { date, time });
        self
    }
}

/// Result of [`analyze_plan`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanReport {
    /// Flagged tracks in chronological order.
    pub tracks: TrackList,
    /// Summary statistics.
    pub summary: ScheduleSummary,
    /// Lines not used as tracks.
    pub skipped: Vec<SkippedLine>,
    /// The rewritten plan, when a rewrite was requested.
    pub rewritten: Option<RewriteOutcome>,
}

/// Analyzes a plan, optionally after rewriting it onto a new date.
///
/// When a rewrite is requested, the analysis runs on the rewritten text.
/// Each skipped line is logged once, as reported by the plan parse.
///
/// # Errors
/// - Any error of [`rewrite_dates`](crate::rewrite_dates) or
///   [`parse_plan`](crate::parse_plan).
/// - [`TrackError::NoData`] if no track survives parsing.
pub fn analyze_plan(content: &str, options: &PlanOptions, config: &EngineConfig) -> Result<PlanReport> {
    let rewritten = match options.rewrite {
        Some(anchor) => Some(rewrite_text(content, anchor.date, anchor.time, config)?),
        None => None,
    };
    let source = rewritten.as_ref().map_or(content, |r| r.content.as_str());

    let outcome = parse_document(source, config)?;
    log_skipped("analyze_plan", &outcome.skipped);
    let analysis = analyze(outcome.value.track_records(), config);
    if analysis.tracks.is_empty() {
        return Err(TrackError::no_data("the file contains no valid track data"));
    }
    let summary = analysis.summary(config);

    debug!(
        tracks = summary.track_count,
        gateways = summary.tracks_by_gateway.len(),
        flagged = summary.flagged_count,
        rewritten = rewritten.is_some(),
        "analyzed plan"
    );
    Ok(PlanReport {
        tracks: analysis.tracks,
        summary,
        skipped: outcome.skipped,
        rewritten,
    })
}
