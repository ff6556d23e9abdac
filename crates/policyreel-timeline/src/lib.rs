//! # policyreel-timeline
//!
//! Scene planning and duration resolution for narrated training videos.
//!
//! A [`Timeline`] is built from a storyboard, optional narration segments
//! and optional background clips. The interactive preview samples it frame
//! by frame; the export path packages it into an [`ExportManifest`]. Both
//! go through [`Timeline::build`], so both see the same scenes.

pub mod duration;
pub mod manifest;
pub mod narration;
pub mod planner;
pub mod timeline;

pub use duration::{total_duration, CompositionLength};
pub use manifest::{Composition, ExportManifest, ManifestTiming};
pub use narration::{layout_segments, narration_units, NarrationClip, NarrationUnit};
pub use planner::{classify_segment, plan, PlanMode};
pub use timeline::{Timeline, VisibleScene};
