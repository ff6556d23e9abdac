//! Export manifest: everything the headless renderer needs, built from a
//! [`Timeline`] so export can never plan differently from preview.

use std::path::Path;

use policyreel_core::{
    CrossfadeCurve, OutputConfig, ReelError, ReelResult, SpringConfig, TimelineConfig,
};
use policyreel_ir::{BackgroundClips, Segment, Storyboard};
use serde::{Deserialize, Serialize};

use crate::timeline::{entrance_spring, Timeline};

/// Composition header in the shape declarative renderers expect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Composition {
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    pub duration_in_frames: u64,
}

/// The timing config packaged with a manifest, so `verify` can re-plan.
/// Same fields as [`TimelineConfig`] under camelCase keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestTiming {
    pub fps: f64,
    pub handle_frames: u64,
    pub title_card_seconds: f64,
    pub intro_seconds: f64,
    pub module_seconds: f64,
    pub summary_seconds: f64,
    pub tail_buffer_seconds: f64,
    pub crossfade: CrossfadeCurve,
    #[serde(with = "entrance_spring")]
    pub entrance: SpringConfig,
}

impl From<&TimelineConfig> for ManifestTiming {
    fn from(t: &TimelineConfig) -> Self {
        Self {
            fps: t.fps,
            handle_frames: t.handle_frames,
            title_card_seconds: t.title_card_seconds,
            intro_seconds: t.intro_seconds,
            module_seconds: t.module_seconds,
            summary_seconds: t.summary_seconds,
            tail_buffer_seconds: t.tail_buffer_seconds,
            crossfade: t.crossfade,
            entrance: t.entrance,
        }
    }
}

impl From<&ManifestTiming> for TimelineConfig {
    fn from(t: &ManifestTiming) -> Self {
        Self {
            fps: t.fps,
            handle_frames: t.handle_frames,
            title_card_seconds: t.title_card_seconds,
            intro_seconds: t.intro_seconds,
            module_seconds: t.module_seconds,
            summary_seconds: t.summary_seconds,
            tail_buffer_seconds: t.tail_buffer_seconds,
            crossfade: t.crossfade,
            entrance: t.entrance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportManifest {
    pub composition: Composition,
    pub timing: ManifestTiming,
    pub storyboard: Storyboard,
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub background_clips: BackgroundClips,
    pub timeline: Timeline,
    /// Hex SHA-256 of `timeline`.
    pub fingerprint: String,
}

impl ExportManifest {
    /// Plan and package a composition for export.
    pub fn build(
        storyboard: &Storyboard,
        segments: &[Segment],
        clips: &BackgroundClips,
        timing: &TimelineConfig,
        output: &OutputConfig,
    ) -> ReelResult<Self> {
        let timeline = Timeline::build(storyboard, Some(segments), Some(clips), timing, output)?;
        let fingerprint = timeline.fingerprint()?.to_hex();
        Ok(Self {
            composition: Composition {
                fps: timeline.fps,
                width: timeline.width,
                height: timeline.height,
                duration_in_frames: timeline.duration_in_frames,
            },
            timing: ManifestTiming::from(timing),
            storyboard: storyboard.clone(),
            segments: segments.to_vec(),
            background_clips: clips.clone(),
            timeline,
            fingerprint,
        })
    }

    /// Re-plan from the packaged inputs and confirm the result is identical
    /// to the packaged timeline. Run by the export path before rendering.
    pub fn verify(&self) -> ReelResult<()> {
        let output = OutputConfig {
            width: self.composition.width,
            height: self.composition.height,
        };
        let timing = TimelineConfig::from(&self.timing);
        let replanned = Timeline::build(
            &self.storyboard,
            Some(self.segments.as_slice()),
            Some(&self.background_clips),
            &timing,
            &output,
        )?;
        let replanned_hash = replanned.fingerprint()?.to_hex();

        if replanned_hash != self.fingerprint || replanned != self.timeline {
            return Err(ReelError::Timeline(format!(
                "manifest timeline {} does not match re-planned timeline {}",
                self.fingerprint, replanned_hash
            )));
        }
        if self.composition.duration_in_frames != replanned.duration_in_frames
            || self.composition.fps != replanned.fps
        {
            return Err(ReelError::Timeline(
                "composition header disagrees with timeline".into(),
            ));
        }
        Ok(())
    }

    pub fn write_to(&self, path: &Path) -> ReelResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn read_from(path: &Path) -> ReelResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use policyreel_ir::StoryboardBuilder;

    fn inputs() -> (Storyboard, Vec<Segment>, BackgroundClips) {
        let sb = StoryboardBuilder::new("Harassment Prevention")
            .overview("Definitions")
            .module("Recognize", &["Examples"])
            .summary("Speak up")
            .build();
        let segs = vec![
            Segment::new("Definitions", 2.0, 2.5, "0.mp3"),
            Segment::new("Recognize", 4.9, 3.1, "1.mp3"),
            Segment::new("Speak up", 8.4, 2.0, "2.mp3"),
        ];
        let clips = BackgroundClips::from_refs(["i.mp4", "m.mp4", "s.mp4"]);
        (sb, segs, clips)
    }

    #[test]
    fn test_manifest_matches_preview_timeline() {
        let (sb, segs, clips) = inputs();
        let timing = TimelineConfig::default();
        let output = OutputConfig::default();
        let preview =
            Timeline::build(&sb, Some(segs.as_slice()), Some(&clips), &timing, &output).unwrap();
        let manifest = ExportManifest::build(&sb, &segs, &clips, &timing, &output).unwrap();

        assert_eq!(manifest.timeline, preview);
        assert_eq!(manifest.fingerprint, preview.fingerprint().unwrap().to_hex());
        assert_eq!(manifest.composition.duration_in_frames, preview.duration_in_frames);
        assert!(manifest.verify().is_ok());
    }

    #[test]
    fn test_verify_detects_tampering() {
        let (sb, segs, clips) = inputs();
        let mut manifest = ExportManifest::build(
            &sb,
            &segs,
            &clips,
            &TimelineConfig::default(),
            &OutputConfig::default(),
        )
        .unwrap();
        manifest.timeline.scenes[1].start_frame += 1;
        assert!(manifest.verify().is_err());
    }

    #[test]
    fn test_manifest_file_roundtrip_still_verifies() {
        let (sb, segs, clips) = inputs();
        let manifest = ExportManifest::build(
            &sb,
            &segs,
            &clips,
            &TimelineConfig::default(),
            &OutputConfig::default(),
        )
        .unwrap();

        let dir = std::env::temp_dir().join(format!("policyreel_manifest_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("export").join("manifest.json");
        manifest.write_to(&path).unwrap();

        let loaded = ExportManifest::read_from(&path).unwrap();
        assert_eq!(loaded, manifest);
        assert!(loaded.verify().is_ok());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_composition_json_shape() {
        let (sb, segs, clips) = inputs();
        let manifest = ExportManifest::build(
            &sb,
            &segs,
            &clips,
            &TimelineConfig::default(),
            &OutputConfig::default(),
        )
        .unwrap();
        let value = serde_json::to_value(&manifest).unwrap();
        assert_eq!(value["composition"]["durationInFrames"], 342);
        assert_eq!(value["timeline"]["scenes"][0]["kind"]["type"], "intro");
        assert_eq!(value["backgroundClips"][2], "s.mp4");
    }

    #[test]
    fn test_timing_block_uses_camel_case() {
        let (sb, segs, clips) = inputs();
        let timing = TimelineConfig {
            handle_frames: 10,
            ..TimelineConfig::default()
        };
        let manifest =
            ExportManifest::build(&sb, &segs, &clips, &timing, &OutputConfig::default()).unwrap();
        let value = serde_json::to_value(&manifest).unwrap();

        assert_eq!(value["timing"]["handleFrames"], 10);
        assert_eq!(value["timing"]["titleCardSeconds"], 2.0);
        assert!(value["timing"].get("handle_frames").is_none());
        assert_eq!(value["timing"]["entrance"]["overshootClamping"], false);
        assert_eq!(value["timeline"]["entrance"]["overshootClamping"], false);
        assert!(value["timeline"]["entrance"].get("overshoot_clamping").is_none());

        assert_eq!(TimelineConfig::from(&manifest.timing), timing);
    }
}
