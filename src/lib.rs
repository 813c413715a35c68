//! Ground-station track plan engine.
//!
//! Parses satellite contact schedules, normalizes their time windows, flags
//! anomalies and re-emits corrected or merged plans.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `TrackRecord`, `TrackFlag`, `TrackList`,
//!   `PlanDocument` and the compact timestamp codec
//! - **`parser`**: Vendor XML and plan text parsers
//! - **`expansion`**: 6-hour pattern expansion and deploy-day alignment
//! - **`analysis`**: Duration and adjacency flags, summary statistics
//! - **`rewrite`**: Plan re-dating onto a new deploy date
//! - **`merge`**: Single-gateway plan merged into a multi-gateway plan
//! - **`serialize`**: Plan text rendering
//! - **`pipeline`**: End-to-end entry points used by callers
//! - **`artifact`**: Session-scoped one-shot download handles
//! - **`config`**, **`error`**: Thresholds, markers and the error taxonomy
//!
//! # Data Flow
//!
//! ```text
//! XML  ──parse──▶ expand/align ──┐
//!                                ├─▶ analyze ─▶ serialize | rewrite | merge
//! plan ──parse───────────────────┘
//! ```
//!
//! Every operation is a pure transformation over owned values; only the
//! [`ArtifactStore`] keeps state, and it belongs to one caller.

pub mod analysis;
pub mod artifact;
pub mod config;
pub mod error;
pub mod expansion;
pub mod merge;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod rewrite;
pub mod serialize;

pub use analysis::{analyze, Analysis, ScheduleSummary};
pub use artifact::{Artifact, ArtifactError, ArtifactKind, ArtifactStore, ArtifactToken};
pub use config::EngineConfig;
pub use error::{LineError, ParseOutcome, Result, SkippedLine, TrackError};
pub use expansion::expand_and_align;
pub use merge::{merge_plans, MergeOutcome};
pub use models::{FlagSet, PlanDocument, TrackFlag, TrackLine, TrackList, TrackRecord};
pub use parser::{parse_plan, parse_xml};
pub use pipeline::{analyze_plan, analyze_xml, DeployAnchor, PlanOptions, PlanReport, XmlReport, XmlRequest};
pub use rewrite::{rewrite_dates, RewriteOutcome};
pub use serialize::{serialize, serialize_plan};
