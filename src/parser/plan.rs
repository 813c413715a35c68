//! Plan text parser.
//!
//! # Format
//! - Line 1: epoch (opaque).
//! - Line 2: deploy marker (opaque).
//! - Then gateway blocks: a header line starting with the gateway marker,
//!   followed by track lines `satellite DAT RECUR start end` until the next
//!   header.
//!
//! Blank lines are ignored everywhere. A track line that fails to parse is
//! kept in its block as an unparsed line and reported in the outcome; it
//! never aborts the document. Lines before the first header are kept in the
//! document preamble and reported as well.

use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{log_skipped, LineError, ParseOutcome, Result, SkippedLine, TrackError};
use crate::models::{GatewayBlock, PlanDocument, PlanLine, TrackLine};

/// A trimmed, non-blank source line with its 1-based line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SourceLine<'a> {
    pub number: usize,
    pub text: &'a str,
}

/// Gateway header and its lines, before field parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawBlock<'a> {
    pub name: &'a str,
    pub lines: Vec<SourceLine<'a>>,
}

/// Trimmed non-blank lines of `content`.
pub(crate) fn non_blank_lines(content: &str) -> Vec<SourceLine<'_>> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| SourceLine {
            number: i + 1,
            text: line.trim(),
        })
        .filter(|line| !line.text.is_empty())
        .collect()
}

/// Splits plan body lines into gateway blocks.
///
/// Returns the lines found before the first header and the blocks in
/// first-appearance order. A repeated header restarts its block in place.
pub(crate) fn split_gateway_blocks<'a>(
    body: &[SourceLine<'a>],
    marker: &str,
) -> (Vec<SourceLine<'a>>, Vec<RawBlock<'a>>) {
    let mut preamble = Vec::new();
    let mut blocks: Vec<RawBlock<'a>> = Vec::new();
    let mut current: Option<usize> = None;

    for line in body {
        if line.text.starts_with(marker) {
            let idx = match blocks.iter().position(|b| b.name == line.text) {
                Some(idx) => {
                    debug!(gateway = line.text, "repeated gateway header, restarting block");
                    blocks[idx].lines.clear();
                    idx
                }
                None => {
                    blocks.push(RawBlock {
                        name: line.text,
                        lines: Vec::new(),
                    });
                    blocks.len() - 1
                }
            };
            current = Some(idx);
            continue;
        }
        match current {
            Some(idx) => blocks[idx].lines.push(*line),
            None => preamble.push(*line),
        }
    }

    (preamble, blocks)
}

/// Parses one track line and checks its markers.
pub(crate) fn parse_track_line(text: &str, config: &EngineConfig) -> std::result::Result<TrackLine, LineError> {
    let track = TrackLine::parse(text)?;
    if !config.accepts_markers(&track.data_marker, &track.recurrence_marker) {
        return Err(LineError::UnexpectedMarkers {
            data: track.data_marker,
            recurrence: track.recurrence_marker,
        });
    }
    Ok(track)
}

/// Parses a plan document.
///
/// # Errors
/// - [`TrackError::Format`] if fewer than 3 non-blank lines exist.
/// - [`TrackError::NoGateway`] if no gateway header follows the deploy line.
///
/// # Example
///
/// ```
/// use u_trackplan::{parse_plan, EngineConfig};
///
/// let text = "1710496800000\n20240315000000.000\nGS_A\n\
///             SAT1 DAT RECUR 20240315100000.000 20240315103000.000\n";
/// let outcome = parse_plan(text, &EngineConfig::default()).unwrap();
/// assert_eq!(outcome.value.gateway_names(), vec!["GS_A"]);
/// assert!(outcome.is_clean());
/// ```
pub fn parse_plan(content: &str, config: &EngineConfig) -> Result<ParseOutcome<PlanDocument>> {
    let outcome = parse_document(content, config)?;
    log_skipped("parse_plan", &outcome.skipped);
    Ok(outcome)
}

/// [`parse_plan`] without logging the skipped lines.
pub(crate) fn parse_document(
    content: &str,
    config: &EngineConfig,
) -> Result<ParseOutcome<PlanDocument>> {
    let lines = non_blank_lines(content);
    if lines.len() < 3 {
        return Err(TrackError::format(
            "file too short - needs at least 3 lines (epoch, deploy time, and one gateway)",
        ));
    }

    let (preamble, blocks) = split_gateway_blocks(&lines[2..], &config.gateway_marker);
    if blocks.is_empty() {
        return Err(TrackError::NoGateway {
            marker: config.gateway_marker.clone(),
        });
    }

    let mut skipped: Vec<SkippedLine> = preamble
        .iter()
        .map(|line| SkippedLine::new(line.number, line.text, LineError::OutsideGateway))
        .collect();

    let mut document = PlanDocument::new(lines[0].text, lines[1].text);
    document.preamble = preamble.iter().map(|line| line.text.to_string()).collect();
    for block in blocks {
        let mut gateway = GatewayBlock::new(block.name);
        for line in block.lines {
            match parse_track_line(line.text, config) {
                Ok(track) => gateway.lines.push(PlanLine::Track(track)),
                Err(reason) => {
                    skipped.push(SkippedLine::new(line.number, line.text, reason));
                    gateway.lines.push(PlanLine::Other(line.text.to_string()));
                }
            }
        }
        document.gateways.push(gateway);
    }
    skipped.sort_by_key(|s| s.line_number);

    debug!(
        gateways = document.gateways.len(),
        tracks = document.track_count(),
        skipped = skipped.len(),
        "parsed plan"
    );
    Ok(ParseOutcome::new(document, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = "\
1710496800000
20240315000000.000
GS_A
SAT1 DAT RECUR 20240315100000.000 20240315103000.000
SAT2 DAT RECUR 20240315103000.000 20240315110000.000
GS_B

SAT3 DAT RECUR 20240315233000.000 20240316000500.000
";

    #[test]
    fn test_parse_plan_basic() {
        let outcome = parse_plan(PLAN, &EngineConfig::default()).unwrap();
        let doc = outcome.value;
        assert_eq!(doc.epoch, "1710496800000");
        assert_eq!(doc.deploy_marker, "20240315000000.000");
        assert_eq!(doc.gateway_names(), vec!["GS_A", "GS_B"]);
        assert_eq!(doc.track_count(), 3);
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn test_too_short() {
        let err = parse_plan("123\n\n20240315000000.000\n", &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, TrackError::Format(_)));
    }

    #[test]
    fn test_no_gateway() {
        let text = "123\n20240315000000.000\nSAT1 DAT RECUR 20240315100000 20240315103000\n";
        let err = parse_plan(text, &EngineConfig::default()).unwrap_err();
        assert_eq!(
            err,
            TrackError::NoGateway {
                marker: "GS_".into()
            }
        );
    }

    #[test]
    fn test_bad_lines_are_skipped_not_fatal() {
        let text = "\
1
20240315000000.000
GS_A
# maintenance window follows
SAT1 DAT RECUR 20240315100000.000 20240315103000.000
SAT2 DAT RECUR 2024031510xx00.000 20240315110000.000
SAT3 DAT ONCE 20240315110000.000 20240315113000.000
";
        let outcome = parse_plan(text, &EngineConfig::default()).unwrap();
        assert_eq!(outcome.value.track_count(), 1);
        assert_eq!(outcome.skipped.len(), 3);
        assert_eq!(outcome.skipped[0].line_number, 4);
        assert_eq!(
            outcome.skipped[0].reason,
            LineError::TooFewFields { found: 4 }
        );
        assert!(matches!(
            outcome.skipped[1].reason,
            LineError::BadTimestamp { .. }
        ));
        assert!(matches!(
            outcome.skipped[2].reason,
            LineError::UnexpectedMarkers { .. }
        ));
        // Unparsed lines stay in their block.
        assert_eq!(outcome.value.gateways[0].lines.len(), 4);
    }

    #[test]
    fn test_preamble_lines_reported() {
        let text = "1\n20240315000000.000\nstray\nGS_A\nS1 DAT RECUR 20240315100000 20240315103000\n";
        let outcome = parse_plan(text, &EngineConfig::default()).unwrap();
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].reason, LineError::OutsideGateway);
        assert_eq!(outcome.skipped[0].line_number, 3);
        assert_eq!(outcome.value.preamble, vec!["stray"]);
    }

    #[test]
    fn test_repeated_header_restarts_block() {
        let text = "\
1
20240315000000.000
GS_A
S1 DAT RECUR 20240315100000 20240315103000
GS_B
S2 DAT RECUR 20240315100000 20240315103000
GS_A
S3 DAT RECUR 20240315120000 20240315123000
";
        let doc = parse_plan(text, &EngineConfig::default()).unwrap().value;
        assert_eq!(doc.gateway_names(), vec!["GS_A", "GS_B"]);
        let a: Vec<_> = doc.gateways[0].tracks().map(|t| t.satellite.as_str()).collect();
        assert_eq!(a, vec!["S3"]);
    }

    #[test]
    fn test_custom_marker() {
        let config = EngineConfig::default().with_gateway_marker("GW-");
        let text = "1\n20240315000000.000\nGW-NORTH\nS1 DAT RECUR 20240315100000 20240315103000\n";
        let doc = parse_plan(text, &config).unwrap().value;
        assert_eq!(doc.gateway_names(), vec!["GW-NORTH"]);
    }

    #[test]
    fn test_split_blocks_line_numbers() {
        let lines = non_blank_lines("a\n\n  b  \nc");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].number, 3);
        assert_eq!(lines[1].text, "b");
    }
}
