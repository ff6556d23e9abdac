use crate::storyboard::{Module, QuizQuestion, Storyboard};

/// A builder for constructing a Storyboard programmatically.
/// Useful for fallback content and unit testing.
pub struct StoryboardBuilder {
    storyboard: Storyboard,
}

impl StoryboardBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            storyboard: Storyboard {
                title: title.into(),
                language: "en".to_string(),
                ..Storyboard::default()
            },
        }
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.storyboard.language = language.into();
        self
    }

    pub fn intro(mut self, intro: impl Into<String>) -> Self {
        self.storyboard.intro = intro.into();
        self
    }

    /// Append one overview bullet.
    pub fn overview(mut self, point: impl Into<String>) -> Self {
        self.storyboard.overview.push(point.into());
        self
    }

    /// Append a module. Modules keep insertion order.
    pub fn module(mut self, title: impl Into<String>, points: &[&str]) -> Self {
        self.storyboard.modules.push(Module::new(
            title,
            points.iter().map(|p| p.to_string()).collect(),
        ));
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.storyboard.summary = summary.into();
        self
    }

    pub fn quiz(mut self, question: impl Into<String>, answers: &[&str], correct: usize) -> Self {
        self.storyboard.quiz.push(QuizQuestion {
            question: question.into(),
            answers: answers.iter().map(|a| a.to_string()).collect(),
            correct_answer_index: correct,
        });
        self
    }

    pub fn build(self) -> Storyboard {
        self.storyboard
    }
}
