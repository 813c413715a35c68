//! Plan merging.
//!
//! Combines an existing multi-gateway plan with a freshly generated
//! single-gateway plan (the output of [`serialize`](crate::serialize)).
//!
//! # Rules
//!
//! - The merged header is the new plan's epoch and deploy marker.
//! - The shared date is the `YYYYMMDD` prefix of the new deploy marker.
//! - An old gateway with the new gateway's name is replaced wholesale and
//!   keeps its position. Other old gateways are re-dated onto the shared
//!   date with the rollover rule of [`redate`].
//! - An unmatched new gateway is appended last.
//!
//! Merging is a text operation: nothing is re-analyzed or re-flagged.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{log_skipped, LineError, Result, SkippedLine, TrackError};
use crate::models::timestamp::parse_compact_date;
use crate::models::TrackLine;
use crate::parser::plan::{non_blank_lines, split_gateway_blocks};
use crate::rewrite::redate;
use crate::serialize::push_line;

/// Result of [`merge_plans`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeOutcome {
    /// Merged plan text.
    pub content: String,
    /// Gateway taken from the new plan.
    pub gateway: String,
    /// Whether an old gateway of the same name was replaced.
    pub replaced_existing: bool,
    /// Old-plan lines that were not re-dated.
    pub skipped: Vec<SkippedLine>,
}

/// Merges `new_content` (single gateway) into `old_content`.
///
/// # Errors
/// [`TrackError::Format`] if either input has fewer than 3 non-blank lines
/// or the new deploy marker does not start with a `YYYYMMDD` date.
///
/// # Example
///
/// ```
/// use u_trackplan::{merge_plans, EngineConfig};
///
/// let old = "1\n20240301000000.000\nGS_A\nA1 DAT RECUR 20240301100000.000 20240301103000.000\n\
///            GS_B\nB1 DAT RECUR 20240301233000.000 20240302000500.000\n";
/// let new = "2\n20240415060000.000\nGS_A\nN1 DAT RECUR 20240415010000.000 20240415013000.000\n";
///
/// let merged = merge_plans(old, new, &EngineConfig::default()).unwrap();
/// assert!(merged.replaced_existing);
/// assert_eq!(
///     merged.content,
///     "2\n20240415060000.000\n\
///      GS_A\nN1 DAT RECUR 20240415010000.000 20240415013000.000\n\
///      GS_B\nB1 DAT RECUR 20240415233000.000 20240416000500.000\n"
/// );
/// ```
pub fn merge_plans(
    old_content: &str,
    new_content: &str,
    config: &EngineConfig,
) -> Result<MergeOutcome> {
    let new_lines = non_blank_lines(new_content);
    if new_lines.len() < 3 {
        return Err(TrackError::format(
            "invalid new gateway file format - needs epoch, deploy time and gateway name",
        ));
    }
    let new_epoch = new_lines[0].text;
    let new_marker = new_lines[1].text;
    let gateway = new_lines[2].text;
    let new_tracks = &new_lines[3..];

    let shared_date = parse_compact_date(new_marker).ok_or_else(|| {
        TrackError::format(format!(
            "new deploy marker '{new_marker}' does not start with a YYYYMMDD date"
        ))
    })?;

    let old_lines = non_blank_lines(old_content);
    if old_lines.len() < 3 {
        return Err(TrackError::format(
            "invalid old plan file format - needs at least 3 lines",
        ));
    }
    let (preamble, blocks) = split_gateway_blocks(&old_lines[2..], &config.gateway_marker);

    let mut skipped: Vec<SkippedLine> = preamble
        .iter()
        .map(|line| SkippedLine::new(line.number, line.text, LineError::OutsideGateway))
        .collect();

    let mut out = String::new();
    push_line(&mut out, new_epoch);
    push_line(&mut out, new_marker);

    let mut replaced_existing = false;
    for block in &blocks {
        push_line(&mut out, block.name);
        if block.name == gateway {
            replaced_existing = true;
            for line in new_tracks {
                push_line(&mut out, line.text);
            }
            continue;
        }
        for line in &block.lines {
            match TrackLine::parse(line.text) {
                Ok(track) => push_line(&mut out, &redate(&track, shared_date).to_string()),
                Err(reason) => {
                    skipped.push(SkippedLine::new(line.number, line.text, reason));
                    push_line(&mut out, line.text);
                }
            }
        }
    }

    if !replaced_existing {
        push_line(&mut out, gateway);
        for line in new_tracks {
            push_line(&mut out, line.text);
        }
    }
    skipped.sort_by_key(|s| s.line_number);
    log_skipped("merge_plans", &skipped);

    debug!(
        gateway,
        replaced_existing,
        old_gateways = blocks.len(),
        skipped = skipped.len(),
        "merged plans"
    );
    Ok(MergeOutcome {
        content: out,
        gateway: gateway.to_string(),
        replaced_existing,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_plan;

    const OLD: &str = "\
1709251200000
20240301000000.000
GS_A
A1 DAT RECUR 20240301100000.000 20240301103000.000
A2 DAT RECUR 20240301103000.000 20240301110000.000
GS_B
B1 DAT RECUR 20240301233000.000 20240302000500.000
# manual slot
GS_C
C1 DAT RECUR 20240301050000.000 20240301053000.000
";

    const NEW_B: &str = "\
1713139200000
20240415080000.000
GS_B
N1 DAT RECUR 20240415010000.000 20240415013000.000
N2 DAT RECUR 20240415013000.000 20240415020000.000
";

    #[test]
    fn test_replace_keeps_position() {
        let merged = merge_plans(OLD, NEW_B, &EngineConfig::default()).unwrap();
        assert!(merged.replaced_existing);
        assert_eq!(merged.gateway, "GS_B");

        let doc = parse_plan(&merged.content, &EngineConfig::default()).unwrap().value;
        assert_eq!(doc.epoch, "1713139200000");
        assert_eq!(doc.deploy_marker, "20240415080000.000");
        assert_eq!(doc.gateway_names(), vec!["GS_A", "GS_B", "GS_C"]);

        let b: Vec<_> = doc.gateways[1].tracks().map(|t| t.satellite.as_str()).collect();
        assert_eq!(b, vec!["N1", "N2"]);
        assert!(!merged.content.contains("B1"));
        assert!(!merged.content.contains("# manual slot"));
    }

    #[test]
    fn test_other_gateways_redated() {
        let merged = merge_plans(OLD, NEW_B, &EngineConfig::default()).unwrap();
        assert!(merged
            .content
            .contains("GS_A\nA1 DAT RECUR 20240415100000.000 20240415103000.000\n"));
        assert!(merged
            .content
            .contains("GS_C\nC1 DAT RECUR 20240415050000.000 20240415053000.000\n"));
    }

    #[test]
    fn test_new_gateway_appended() {
        let new = "9\n20240415080000.000\nGS_D\nD1 DAT RECUR 20240415010000.000 20240415013000.000\n";
        let merged = merge_plans(OLD, new, &EngineConfig::default()).unwrap();
        assert!(!merged.replaced_existing);

        let doc = parse_plan(&merged.content, &EngineConfig::default()).unwrap().value;
        assert_eq!(doc.gateway_names(), vec!["GS_A", "GS_B", "GS_C", "GS_D"]);
        // Midnight-crossing track of GS_B rolls to the next day.
        assert!(merged
            .content
            .contains("B1 DAT RECUR 20240415233000.000 20240416000500.000\n"));
        // Non-track line kept and reported.
        assert!(merged.content.contains("# manual slot\n"));
        assert_eq!(merged.skipped.len(), 1);
        assert_eq!(merged.skipped[0].line_number, 8);
    }

    #[test]
    fn test_old_plan_without_gateways() {
        let merged = merge_plans("0\n20240301000000.000\nstray line\n", NEW_B, &EngineConfig::default())
            .unwrap();
        assert!(!merged.replaced_existing);
        assert!(merged.content.starts_with("1713139200000\n20240415080000.000\nGS_B\nN1"));
        assert_eq!(merged.skipped[0].reason, LineError::OutsideGateway);
    }

    #[test]
    fn test_format_errors() {
        let config = EngineConfig::default();
        assert!(matches!(
            merge_plans(OLD, "1\n2\n", &config).unwrap_err(),
            TrackError::Format(_)
        ));
        assert!(matches!(
            merge_plans("1\n2\n", NEW_B, &config).unwrap_err(),
            TrackError::Format(_)
        ));
        assert!(matches!(
            merge_plans(OLD, "1\nnot-a-date\nGS_B\n", &config).unwrap_err(),
            TrackError::Format(_)
        ));
    }
}
