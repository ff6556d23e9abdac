use serde::{Deserialize, Serialize};

use crate::storyboard::Storyboard;

/// Which narrative unit a scene renders.
///
/// Computed once by the planner so renderers never re-derive it from raw
/// segment positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "index", rename_all = "lowercase")]
pub enum SceneKind {
    Intro,
    /// Overview bullet by position.
    Overview(usize),
    /// Module by position in `Storyboard::modules`.
    Module(usize),
    Summary,
}

impl SceneKind {
    /// Index into the overview or module list; 0 for intro and summary.
    pub fn narrative_index(&self) -> usize {
        match self {
            SceneKind::Overview(i) | SceneKind::Module(i) => *i,
            SceneKind::Intro | SceneKind::Summary => 0,
        }
    }
}

impl std::fmt::Display for SceneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneKind::Intro => write!(f, "intro"),
            SceneKind::Overview(i) => write!(f, "overview[{}]", i),
            SceneKind::Module(i) => write!(f, "module[{}]", i),
            SceneKind::Summary => write!(f, "summary"),
        }
    }
}

/// Narration attached to a segment-driven scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Narration {
    pub text: String,
    pub audio_ref: String,
}

/// One renderable unit on the timeline. Derived on every call, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDescriptor {
    pub start_frame: u64,
    pub duration_frames: u64,
    pub kind: SceneKind,
    pub background_clip: Option<String>,
    pub narration: Option<Narration>,
}

impl SceneDescriptor {
    pub fn new(kind: SceneKind, start_frame: u64, duration_frames: u64) -> Self {
        Self {
            start_frame,
            duration_frames,
            kind,
            background_clip: None,
            narration: None,
        }
    }

    pub fn with_background(mut self, clip: Option<&str>) -> Self {
        self.background_clip = clip.map(str::to_string);
        self
    }

    pub fn with_narration(mut self, narration: Narration) -> Self {
        self.narration = Some(narration);
        self
    }

    /// First frame after this scene, saturating at `u64::MAX`.
    pub fn end_frame(&self) -> u64 {
        self.start_frame.saturating_add(self.duration_frames)
    }

    /// Whether `frame` falls inside `[start, end)`.
    pub fn contains(&self, frame: u64) -> bool {
        frame >= self.start_frame && frame < self.end_frame()
    }

    /// Frames the two scenes share; zero when they are disjoint.
    pub fn overlap_with(&self, other: &SceneDescriptor) -> u64 {
        self.end_frame()
            .min(other.end_frame())
            .saturating_sub(self.start_frame.max(other.start_frame))
    }

    /// Resolve the text this scene shows from the storyboard it was planned
    /// against.
    pub fn content<'a>(&'a self, storyboard: &'a Storyboard) -> SceneContent<'a> {
        match self.kind {
            SceneKind::Intro => SceneContent {
                heading: &storyboard.title,
                body: vec![storyboard.intro.as_str()],
            },
            SceneKind::Overview(i) => {
                let bullet = match &self.narration {
                    Some(n) => n.text.as_str(),
                    None => storyboard.overview.get(i).map(String::as_str).unwrap_or(""),
                };
                SceneContent {
                    heading: "Overview",
                    body: vec![bullet],
                }
            }
            SceneKind::Module(i) => match storyboard.module(i) {
                Some(module) => SceneContent {
                    heading: &module.title,
                    body: module.points.iter().map(String::as_str).collect(),
                },
                None => SceneContent {
                    heading: "",
                    body: Vec::new(),
                },
            },
            SceneKind::Summary => SceneContent {
                heading: "Summary",
                body: vec![storyboard.summary.as_str()],
            },
        }
    }
}

/// Text payload of a scene, borrowed from the storyboard.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneContent<'a> {
    pub heading: &'a str,
    pub body: Vec<&'a str>,
}
