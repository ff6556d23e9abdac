//! Total composition length.
//!
//! Both the preview and the export path resolve duration through this
//! module; any divergence shows up as audio/video drift or a clipped ending.

use policyreel_core::{Duration, TimelineConfig};
use policyreel_ir::{Segment, Storyboard};
use serde::{Deserialize, Serialize};

use crate::planner::PlanMode;

/// Composition length in frames together with the rate it was computed at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionLength {
    pub duration_in_frames: u64,
    pub fps: f64,
}

impl CompositionLength {
    pub fn as_duration(&self) -> Duration {
        Duration::from_frames(self.duration_in_frames, self.fps)
    }
}

/// Resolve the total length for a storyboard and optional narration.
pub fn total_duration(
    storyboard: &Storyboard,
    segments: Option<&[Segment]>,
    config: &TimelineConfig,
) -> CompositionLength {
    let frames = match (PlanMode::select(segments), segments) {
        (PlanMode::SegmentDriven, Some(segments)) => segment_total(segments, config),
        _ => fallback_total(storyboard.modules.len(), config),
    };
    CompositionLength {
        duration_in_frames: frames,
        fps: config.fps,
    }
}

/// Last narration end (rounded up to a whole frame) plus the tail buffer.
///
/// Never shorter than the title card or than any planned scene, so the
/// per-scene rounding in the planner cannot push a scene past the end.
pub fn segment_total(segments: &[Segment], config: &TimelineConfig) -> u64 {
    let fps = config.fps;
    let last_end = segments
        .iter()
        .map(Segment::end_seconds)
        .fold(0.0_f64, f64::max);
    let narrated = Duration::from_seconds(last_end).frame_count(fps);
    let planned_end = segments
        .iter()
        .map(|s| {
            s.start_time()
                .nearest_frame(fps)
                .saturating_add(s.length().nearest_frames(fps).max(1))
        })
        .max()
        .unwrap_or(0);
    narrated
        .saturating_add(config.tail_buffer_frames())
        .max(planned_end)
        .max(config.title_card_frames().max(1))
}

/// Intro, every module and the summary laid end to end, each shortened by
/// one handle except the last.
pub fn fallback_total(module_count: usize, config: &TimelineConfig) -> u64 {
    let handle = config.handle_frames;
    let intro = config.intro_frames().max(1).saturating_sub(handle);
    let modules = config
        .module_frames()
        .max(1)
        .saturating_sub(handle)
        .saturating_mul(module_count as u64);
    intro
        .saturating_add(modules)
        .saturating_add(config.summary_frames().max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use policyreel_ir::StoryboardBuilder;

    #[test]
    fn test_fallback_total_formula() {
        let cfg = TimelineConfig::default();
        assert_eq!(fallback_total(3, &cfg), 108 + 3 * 123 + 150);
        assert_eq!(fallback_total(0, &cfg), 258);
    }

    #[test]
    fn test_segment_total_adds_buffer() {
        let cfg = TimelineConfig::default();
        let segs = vec![
            Segment::new("a", 2.0, 3.0, "a.mp3"),
            Segment::new("b", 5.4, 2.01, "b.mp3"),
        ];
        // 7.41s * 30 = 222.3 -> 223, plus 30 buffer frames
        assert_eq!(segment_total(&segs, &cfg), 253);
    }

    #[test]
    fn test_segment_total_uses_maximum_not_last() {
        let cfg = TimelineConfig::default();
        let segs = vec![
            Segment::new("long", 2.0, 10.0, "a.mp3"),
            Segment::new("short", 3.0, 1.0, "b.mp3"),
        ];
        assert_eq!(segment_total(&segs, &cfg), 360 + 30);
    }

    #[test]
    fn test_rounding_never_exceeds_total() {
        let cfg = TimelineConfig {
            tail_buffer_seconds: 0.0,
            ..TimelineConfig::default()
        };
        // start 2.02s rounds to 61, 0.02s rounds to 1 frame, ends at 62;
        // the raw end 2.04s is only 61.2 -> 62 frames.
        let segs = vec![Segment::new("a", 2.02, 0.02, "a.mp3")];
        assert_eq!(segment_total(&segs, &cfg), 62);
        // 2.016s -> 60.48 -> 60, 0.016s -> 0.48 -> clamped to 1 frame;
        // raw end 2.032s -> 60.96 -> 61.
        let segs = vec![Segment::new("a", 2.016, 0.016, "a.mp3")];
        assert_eq!(segment_total(&segs, &cfg), 61);
    }

    #[test]
    fn test_short_narration_keeps_title_card() {
        let cfg = TimelineConfig {
            tail_buffer_seconds: 0.0,
            ..TimelineConfig::default()
        };
        let segs = vec![Segment::new("a", 0.0, 0.5, "a.mp3")];
        assert_eq!(segment_total(&segs, &cfg), 60);
    }

    #[test]
    fn test_total_duration_dispatches_on_mode() {
        let cfg = TimelineConfig::default();
        let sb = StoryboardBuilder::new("T").module("M", &[]).summary("S").build();
        let fallback = total_duration(&sb, None, &cfg);
        assert_eq!(fallback.duration_in_frames, 108 + 123 + 150);
        assert_eq!(fallback.fps, 30.0);
        assert!((fallback.as_duration().as_seconds() - 12.7).abs() < 1e-9);

        let segs = vec![Segment::new("a", 2.0, 4.0, "a.mp3")];
        let driven = total_duration(&sb, Some(segs.as_slice()), &cfg);
        assert_eq!(driven.duration_in_frames, 180 + 30);
    }

    #[test]
    fn test_far_future_start_saturates() {
        let cfg = TimelineConfig::default();
        // 1e18s at 30fps does not fit in a u64 frame index.
        let segs = vec![Segment::new("late", 1.0e18, 1.0, "a.mp3")];
        assert_eq!(segment_total(&segs, &cfg), u64::MAX);
    }
}
