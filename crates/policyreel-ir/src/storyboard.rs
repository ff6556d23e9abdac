use serde::{Deserialize, Serialize};

/// The structured course produced by the text-structuring collaborator.
///
/// Immutable once generated; `modules` order is significant because it
/// selects each module's background clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Storyboard {
    pub title: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub intro: String,
    /// Overview bullets. Any length is tolerated by the planner.
    #[serde(default)]
    pub overview: Vec<String>,
    #[serde(default)]
    pub modules: Vec<Module>,
    #[serde(default)]
    pub summary: String,
    /// Carried through to the renderer untouched.
    #[serde(default)]
    pub quiz: Vec<QuizQuestion>,
}

impl Storyboard {
    /// Get a module by index.
    pub fn module(&self, index: usize) -> Option<&Module> {
        self.modules.get(index)
    }

    /// Segment count that maps one narration clip to every narrated unit:
    /// each overview bullet, each module, and the summary.
    pub fn natural_segment_count(&self) -> usize {
        self.overview.len() + self.modules.len() + 1
    }
}

/// One teaching module: a heading and its bullet points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Module {
    pub title: String,
    #[serde(default)]
    pub points: Vec<String>,
}

impl Module {
    pub fn new(title: impl Into<String>, points: Vec<String>) -> Self {
        Self {
            title: title.into(),
            points,
        }
    }
}

/// A multiple-choice question shown after the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub answers: Vec<String>,
    pub correct_answer_index: usize,
}
