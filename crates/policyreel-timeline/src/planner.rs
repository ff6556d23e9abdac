//! Scene planning: storyboard (+ narration segments) to scene descriptors.

use policyreel_core::TimelineConfig;
use policyreel_ir::{BackgroundClips, Narration, SceneDescriptor, SceneKind, Segment, Storyboard};

/// Scheduling policy selected by the presence of narration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanMode {
    /// Scene timing follows narration timestamps.
    SegmentDriven,
    /// Fixed per-scene lengths with crossfade handles.
    Fallback,
}

impl PlanMode {
    /// An empty segment list behaves exactly like no segments.
    pub fn select(segments: Option<&[Segment]>) -> Self {
        match segments {
            Some(s) if !s.is_empty() => PlanMode::SegmentDriven,
            _ => PlanMode::Fallback,
        }
    }
}

impl std::fmt::Display for PlanMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanMode::SegmentDriven => write!(f, "segment-driven"),
            PlanMode::Fallback => write!(f, "fallback"),
        }
    }
}

/// Plan the ordered scenes for a storyboard.
///
/// Pure and deterministic: the same inputs always produce the same
/// descriptors. Degenerate input (no modules, no segments) still yields a
/// valid plan.
pub fn plan(
    storyboard: &Storyboard,
    segments: Option<&[Segment]>,
    clips: Option<&BackgroundClips>,
    config: &TimelineConfig,
) -> Vec<SceneDescriptor> {
    let empty = BackgroundClips::default();
    let clips = clips.unwrap_or(&empty);

    match (PlanMode::select(segments), segments) {
        (PlanMode::SegmentDriven, Some(segments)) => {
            plan_segment_driven(storyboard, segments, clips, config)
        }
        _ => plan_fallback(storyboard, clips, config),
    }
}

/// Map the segment at `position` onto the narrative unit it narrates.
///
/// Overview bullets come first, then one segment per module. The summary
/// claims the final position only when the list has exactly one segment per
/// narrated unit; surplus segments clamp onto the last module instead.
pub fn classify_segment(
    position: usize,
    overview_len: usize,
    module_len: usize,
    segment_count: usize,
) -> SceneKind {
    let summary_position = overview_len + module_len;
    if position < overview_len {
        SceneKind::Overview(position)
    } else if module_len == 0
        || (segment_count == summary_position + 1 && position == summary_position)
    {
        SceneKind::Summary
    } else {
        SceneKind::Module((position - overview_len).min(module_len - 1))
    }
}

fn plan_segment_driven(
    storyboard: &Storyboard,
    segments: &[Segment],
    clips: &BackgroundClips,
    config: &TimelineConfig,
) -> Vec<SceneDescriptor> {
    let fps = config.fps;
    let mut scenes = Vec::with_capacity(segments.len() + 1);

    // The title card always shows, even if narration starts at zero.
    scenes.push(
        SceneDescriptor::new(SceneKind::Intro, 0, config.title_card_frames().max(1))
            .with_background(clips.for_scene(&SceneKind::Intro)),
    );

    let overview_len = storyboard.overview.len();
    let module_len = storyboard.modules.len();

    for (i, segment) in segments.iter().enumerate() {
        let kind = classify_segment(i, overview_len, module_len, segments.len());
        let start_frame = segment.start_time().nearest_frame(fps);
        let duration_frames = segment.length().nearest_frames(fps).max(1);

        tracing::debug!(
            segment = i,
            kind = %kind,
            start_frame,
            duration_frames,
            "planned narrated scene"
        );

        scenes.push(
            SceneDescriptor::new(kind, start_frame, duration_frames)
                .with_background(clips.for_scene(&kind))
                .with_narration(Narration {
                    text: segment.text.clone(),
                    audio_ref: segment.audio_ref.clone(),
                }),
        );
    }

    let natural = storyboard.natural_segment_count();
    if segments.len() != natural {
        tracing::debug!(
            segments = segments.len(),
            natural,
            "segment count differs from narrative units; clamping"
        );
    }

    scenes
}

fn plan_fallback(
    storyboard: &Storyboard,
    clips: &BackgroundClips,
    config: &TimelineConfig,
) -> Vec<SceneDescriptor> {
    let mut units = Vec::with_capacity(storyboard.modules.len() + 2);
    units.push((SceneKind::Intro, config.intro_frames()));
    units.extend((0..storyboard.modules.len()).map(|i| (SceneKind::Module(i), config.module_frames())));
    units.push((SceneKind::Summary, config.summary_frames()));

    let last = units.len() - 1;
    let mut start_frame = 0u64;
    let mut scenes = Vec::with_capacity(units.len());

    for (k, (kind, base)) in units.into_iter().enumerate() {
        let base = base.max(1);
        scenes.push(
            SceneDescriptor::new(kind, start_frame, base).with_background(clips.for_scene(&kind)),
        );
        // Starts advance by the effective length so the next scene begins
        // one handle before this one ends.
        if k < last {
            start_frame = start_frame.saturating_add(base.saturating_sub(config.handle_frames));
        }
    }

    tracing::debug!(scenes = scenes.len(), "planned fallback timeline");
    scenes
}
