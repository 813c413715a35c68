//! Track plan domain models.
//!
//! Provides the normalized unit of schedule data ([`TrackRecord`]), the
//! analysis output ([`TrackList`]) and the line-oriented plan document
//! ([`PlanDocument`]).
//!
//! # Domain Mappings
//!
//! | u-trackplan | Ground segment | Plan text |
//! |-------------|----------------|-----------|
//! | TrackRecord | Contact window | Track line |
//! | gateway | Ground station | Header line (`GS_...`) |
//! | TrackList | Analyzed schedule | n/a |
//! | PlanDocument | Deployable plan | Whole file |

mod plan;
pub mod timestamp;
mod track;
mod track_list;

pub use plan::{GatewayBlock, PlanDocument, PlanLine, TrackLine};
pub use track::{FlagSet, TrackFlag, TrackRecord, DEFAULT_DATA_MARKER, DEFAULT_RECURRENCE_MARKER};
pub use track_list::TrackList;
