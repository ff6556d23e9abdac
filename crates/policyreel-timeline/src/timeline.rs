use policyreel_core::{
    hash_json, interpolate, spring, ContentHash, CrossfadeCurve, Extrapolate, OutputConfig,
    ReelError, ReelResult, SpringConfig, TimelineConfig,
};
use policyreel_ir::{BackgroundClips, SceneDescriptor, Segment, Storyboard};
use serde::{Deserialize, Serialize};

use crate::duration::total_duration;
use crate::planner::{plan, PlanMode};

/// The planned composition: every scene, the total length, and the
/// presentation settings needed to paint any frame of it.
///
/// Preview and export both build this from the same inputs and compare
/// [`Timeline::fingerprint`] to prove they agree frame for frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    pub duration_in_frames: u64,
    pub handle_frames: u64,
    pub crossfade: CrossfadeCurve,
    #[serde(with = "entrance_spring")]
    pub entrance: SpringConfig,
    pub scenes: Vec<SceneDescriptor>,
}

/// camelCase JSON form of [`SpringConfig`], whose own serde keys follow the
/// snake_case TOML config.
pub(crate) mod entrance_spring {
    use policyreel_core::SpringConfig;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Spring {
        mass: f64,
        stiffness: f64,
        damping: f64,
        overshoot_clamping: bool,
    }

    pub fn serialize<S: Serializer>(spring: &SpringConfig, serializer: S) -> Result<S::Ok, S::Error> {
        Spring {
            mass: spring.mass,
            stiffness: spring.stiffness,
            damping: spring.damping,
            overshoot_clamping: spring.overshoot_clamping,
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SpringConfig, D::Error> {
        let s = Spring::deserialize(deserializer)?;
        Ok(SpringConfig {
            mass: s.mass,
            stiffness: s.stiffness,
            damping: s.damping,
            overshoot_clamping: s.overshoot_clamping,
        })
    }
}

/// A scene painted at a given frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleScene {
    /// Index into [`Timeline::scenes`].
    pub scene_index: usize,
    pub opacity: f64,
    /// Spring progress since the scene started, for entrance motion.
    pub entrance: f64,
}

impl Timeline {
    /// Plan a composition. Fails only on an invalid timing config.
    pub fn build(
        storyboard: &Storyboard,
        segments: Option<&[Segment]>,
        clips: Option<&BackgroundClips>,
        timing: &TimelineConfig,
        output: &OutputConfig,
    ) -> ReelResult<Self> {
        timing.validate()?;

        let scenes = plan(storyboard, segments, clips, timing);
        let length = total_duration(storyboard, segments, timing);

        tracing::debug!(
            mode = %PlanMode::select(segments),
            scenes = scenes.len(),
            frames = length.duration_in_frames,
            "built timeline"
        );

        let timeline = Self {
            fps: timing.fps,
            width: output.width,
            height: output.height,
            duration_in_frames: length.duration_in_frames,
            handle_frames: timing.handle_frames,
            crossfade: timing.crossfade,
            entrance: timing.entrance,
            scenes,
        };
        timeline.validate()?;
        Ok(timeline)
    }

    /// Structural check: every scene is non-empty and ends within the total.
    pub fn validate(&self) -> ReelResult<()> {
        if self.duration_in_frames == 0 {
            return Err(ReelError::Timeline("timeline has zero duration".into()));
        }
        for (i, scene) in self.scenes.iter().enumerate() {
            if scene.duration_frames == 0 {
                return Err(ReelError::Timeline(format!(
                    "scene {} ({}) has zero duration",
                    i, scene.kind
                )));
            }
            if scene.end_frame() > self.duration_in_frames {
                return Err(ReelError::Timeline(format!(
                    "scene {} ({}) ends at frame {} past the total of {}",
                    i,
                    scene.kind,
                    scene.end_frame(),
                    self.duration_in_frames
                )));
            }
        }
        Ok(())
    }

    /// SHA-256 of the canonical JSON form.
    pub fn fingerprint(&self) -> ReelResult<ContentHash> {
        hash_json(self)
    }

    /// Scenes visible at `frame`, bottom layer first.
    ///
    /// Two overlapping scenes crossfade across their shared window; in a
    /// silence gap or the tail buffer the most recently ended scene holds.
    pub fn sample(&self, frame: u64) -> Vec<VisibleScene> {
        if frame >= self.duration_in_frames {
            return Vec::new();
        }

        let mut active: Vec<usize> = (0..self.scenes.len())
            .filter(|&i| self.scenes[i].contains(frame))
            .collect();
        active.sort_by_key(|&i| (self.scenes[i].start_frame, i));

        match active.len() {
            0 => self.held_scene(frame).into_iter().collect(),
            1 => vec![self.visible(active[0], frame, 1.0)],
            n => {
                let outgoing = active[n - 2];
                let incoming = active[n - 1];
                let (out_w, in_w) = self.crossfade_weights(outgoing, incoming, frame);
                vec![
                    self.visible(outgoing, frame, out_w),
                    self.visible(incoming, frame, in_w),
                ]
            }
        }
    }

    fn crossfade_weights(&self, outgoing: usize, incoming: usize, frame: u64) -> (f64, f64) {
        let out = &self.scenes[outgoing];
        let inc = &self.scenes[incoming];
        let window_start = inc.start_frame;
        let window_end = out
            .end_frame()
            .min(inc.end_frame())
            .max(window_start.saturating_add(1));
        let progress = interpolate(
            frame as f64,
            (window_start as f64, window_end as f64),
            (0.0, 1.0),
            Extrapolate::Clamp,
        );
        self.crossfade.weights(progress)
    }

    fn held_scene(&self, frame: u64) -> Option<VisibleScene> {
        self.scenes
            .iter()
            .enumerate()
            .filter(|(_, s)| s.end_frame() <= frame)
            .max_by_key(|(i, s)| (s.end_frame(), *i))
            .map(|(i, _)| self.visible(i, frame, 1.0))
    }

    fn visible(&self, scene_index: usize, frame: u64, opacity: f64) -> VisibleScene {
        let local = frame.saturating_sub(self.scenes[scene_index].start_frame);
        VisibleScene {
            scene_index,
            opacity,
            entrance: spring(local as f64, self.fps, &self.entrance),
        }
    }
}
