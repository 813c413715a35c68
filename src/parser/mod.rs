//! Schedule format parsers.
//!
//! - [`xml`]: vendor XML schedule (one repeating 6-hour pattern).
//! - [`plan`]: line-oriented plan text (24 hours, multi-gateway).
//!
//! Both produce raw [`TrackRecord`](crate::models::TrackRecord)s; overlap
//! flags are assigned later by [`analyze`](crate::analysis::analyze).

pub mod plan;
pub mod xml;

pub use plan::parse_plan;
pub use xml::{parse_xml, read_tracks};
