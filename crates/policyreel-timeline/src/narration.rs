//! Narration script and segment layout.
//!
//! The units produced here are exactly the positions the planner maps
//! segments back onto, so a narration built from them always lands on the
//! natural scene order.

use policyreel_ir::{SceneKind, Segment, Storyboard};

/// One piece of text to synthesize, tagged with the scene it narrates.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationUnit {
    pub kind: SceneKind,
    pub text: String,
}

/// A synthesized clip waiting to be placed on the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationClip {
    pub text: String,
    pub audio_ref: String,
    pub duration_seconds: f64,
}

/// Ordered narration script: overview bullets, one unit per module, then
/// the summary. The intro is shown as a silent title card.
pub fn narration_units(storyboard: &Storyboard) -> Vec<NarrationUnit> {
    let mut units = Vec::with_capacity(storyboard.natural_segment_count());

    for (i, point) in storyboard.overview.iter().enumerate() {
        units.push(NarrationUnit {
            kind: SceneKind::Overview(i),
            text: point.trim().to_string(),
        });
    }

    for (i, module) in storyboard.modules.iter().enumerate() {
        let sentences: Vec<&str> = std::iter::once(module.title.as_str())
            .chain(module.points.iter().map(String::as_str))
            .map(|s| s.trim().trim_end_matches('.'))
            .filter(|s| !s.is_empty())
            .collect();
        let text = if sentences.is_empty() {
            String::new()
        } else {
            format!("{}.", sentences.join(". "))
        };
        units.push(NarrationUnit {
            kind: SceneKind::Module(i),
            text,
        });
    }

    units.push(NarrationUnit {
        kind: SceneKind::Summary,
        text: storyboard.summary.trim().to_string(),
    });

    units
}

/// Lay clips end to end starting at `lead_in_seconds`, separated by
/// `gap_seconds` of silence.
pub fn layout_segments(clips: &[NarrationClip], lead_in_seconds: f64, gap_seconds: f64) -> Vec<Segment> {
    let gap = gap_seconds.max(0.0);
    let mut cursor = lead_in_seconds.max(0.0);
    let mut segments = Vec::with_capacity(clips.len());

    for clip in clips {
        segments.push(Segment::new(
            clip.text.clone(),
            cursor,
            clip.duration_seconds,
            clip.audio_ref.clone(),
        ));
        cursor += clip.duration_seconds.max(0.0) + gap;
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::classify_segment;
    use policyreel_ir::StoryboardBuilder;

    fn storyboard() -> Storyboard {
        StoryboardBuilder::new("Expenses")
            .overview("What to claim")
            .overview(" How to claim ")
            .module("Eligible costs", &["Travel.", "Meals"])
            .module("Receipts", &[])
            .summary("Claim honestly.")
            .build()
    }

    #[test]
    fn test_units_follow_planner_positions() {
        let sb = storyboard();
        let units = narration_units(&sb);
        assert_eq!(units.len(), sb.natural_segment_count());
        for (i, unit) in units.iter().enumerate() {
            assert_eq!(
                unit.kind,
                classify_segment(i, sb.overview.len(), sb.modules.len(), units.len())
            );
        }
    }

    #[test]
    fn test_unit_text() {
        let units = narration_units(&storyboard());
        assert_eq!(units[1].text, "How to claim");
        assert_eq!(units[2].text, "Eligible costs. Travel. Meals.");
        assert_eq!(units[3].text, "Receipts.");
        assert_eq!(units[4].text, "Claim honestly.");
    }

    #[test]
    fn test_layout_back_to_back_with_gap() {
        let clips = vec![
            NarrationClip {
                text: "a".into(),
                audio_ref: "a.mp3".into(),
                duration_seconds: 1.5,
            },
            NarrationClip {
                text: "b".into(),
                audio_ref: "b.mp3".into(),
                duration_seconds: 2.0,
            },
        ];
        let segs = layout_segments(&clips, 2.0, 0.5);
        assert_eq!(segs[0].start, 2.0);
        assert_eq!(segs[1].start, 4.0);
        assert_eq!(segs[1].duration, 2.0);
        assert_eq!(segs[1].audio_ref, "b.mp3");
        assert!(layout_segments(&[], 2.0, 0.5).is_empty());
    }
}
