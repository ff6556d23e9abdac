//! Structural checks applied to collaborator output before it reaches the
//! planner. The planner itself assumes valid input.

use policyreel_core::{ReelError, StoryboardRules};

use crate::segment::Segment;
use crate::storyboard::Storyboard;

/// Validate a storyboard against the shape the generator promises.
pub fn validate_storyboard(
    storyboard: &Storyboard,
    rules: &StoryboardRules,
) -> Result<(), Vec<ReelError>> {
    let mut errors = Vec::new();

    if storyboard.title.trim().is_empty() {
        errors.push(ReelError::Storyboard("title must not be empty".into()));
    }

    for (i, module) in storyboard.modules.iter().enumerate() {
        if module.title.trim().is_empty() {
            errors.push(ReelError::Storyboard(format!(
                "module {} has an empty title",
                i
            )));
        }
    }

    if rules.strict_counts {
        if storyboard.modules.len() != rules.module_count {
            errors.push(ReelError::Storyboard(format!(
                "expected {} modules, found {}",
                rules.module_count,
                storyboard.modules.len()
            )));
        }
        if storyboard.overview.len() != rules.overview_count {
            errors.push(ReelError::Storyboard(format!(
                "expected {} overview points, found {}",
                rules.overview_count,
                storyboard.overview.len()
            )));
        }
    }

    for (i, q) in storyboard.quiz.iter().enumerate() {
        if q.answers.is_empty() {
            errors.push(ReelError::Storyboard(format!(
                "quiz question {} has no answers",
                i
            )));
        } else if q.correct_answer_index >= q.answers.len() {
            errors.push(ReelError::Storyboard(format!(
                "quiz question {} marks answer {} correct but has only {} answers",
                i,
                q.correct_answer_index,
                q.answers.len()
            )));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate narration segments: finite, non-negative starts and positive
/// durations. Ordering is not checked; input order is narrative order.
pub fn validate_segments(segments: &[Segment]) -> Result<(), Vec<ReelError>> {
    let mut errors = Vec::new();

    for (i, seg) in segments.iter().enumerate() {
        if !seg.start.is_finite() || seg.start < 0.0 {
            errors.push(ReelError::segment(
                i,
                format!("start must be a non-negative number, got {}", seg.start),
            ));
        }
        if !seg.duration.is_finite() || seg.duration <= 0.0 {
            errors.push(ReelError::segment(
                i,
                format!("duration must be positive, got {}", seg.duration),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
