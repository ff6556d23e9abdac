//! # policyreel-ir
//!
//! The data exchanged between the collaborators and the planner: the
//! storyboard, narration segments, background clip list and the scene
//! descriptors the planner derives from them.

pub mod broll;
pub mod builder;
pub mod scene;
pub mod segment;
pub mod storyboard;
pub mod validate;

pub use broll::{BackgroundClips, ClipSlot};
pub use builder::StoryboardBuilder;
pub use scene::{Narration, SceneContent, SceneDescriptor, SceneKind};
pub use segment::Segment;
pub use storyboard::{Module, QuizQuestion, Storyboard};
