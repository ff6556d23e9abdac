use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ReelError, ReelResult};
use crate::math::SpringConfig;
use crate::time::Duration;
use crate::crossfade::CrossfadeCurve;

/// Default file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "policyreel.toml";

/// Every timing constant the planner and the presentation layer share.
///
/// Preview and export must be handed the same value; nothing else in the
/// workspace hard-codes frame rates or scene lengths.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub fps: f64,
    /// Overlap between consecutive fallback scenes, in frames.
    pub handle_frames: u64,
    /// Title card shown ahead of narration in segment-driven mode.
    pub title_card_seconds: f64,
    pub intro_seconds: f64,
    pub module_seconds: f64,
    pub summary_seconds: f64,
    /// Tail appended after the last narration segment.
    pub tail_buffer_seconds: f64,
    pub crossfade: CrossfadeCurve,
    pub entrance: SpringConfig,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            fps: 30.0,
            handle_frames: 12,
            title_card_seconds: 2.0,
            intro_seconds: 4.0,
            module_seconds: 4.5,
            summary_seconds: 5.0,
            tail_buffer_seconds: 1.0,
            crossfade: CrossfadeCurve::EqualPower,
            entrance: SpringConfig::default(),
        }
    }
}

impl TimelineConfig {
    fn frames(&self, seconds: f64) -> u64 {
        Duration::from_seconds(seconds).nearest_frames(self.fps)
    }

    pub fn title_card_frames(&self) -> u64 {
        self.frames(self.title_card_seconds)
    }

    pub fn intro_frames(&self) -> u64 {
        self.frames(self.intro_seconds)
    }

    pub fn module_frames(&self) -> u64 {
        self.frames(self.module_seconds)
    }

    pub fn summary_frames(&self) -> u64 {
        self.frames(self.summary_seconds)
    }

    pub fn tail_buffer_frames(&self) -> u64 {
        self.frames(self.tail_buffer_seconds)
    }

    /// Reject settings that would produce a degenerate or negative timeline.
    pub fn validate(&self) -> ReelResult<()> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(ReelError::InvalidConfig(format!(
                "timeline.fps must be positive, got {}",
                self.fps
            )));
        }
        for (name, value) in [
            ("title_card_seconds", self.title_card_seconds),
            ("intro_seconds", self.intro_seconds),
            ("module_seconds", self.module_seconds),
            ("summary_seconds", self.summary_seconds),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ReelError::InvalidConfig(format!(
                    "timeline.{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if !self.tail_buffer_seconds.is_finite() || self.tail_buffer_seconds < 0.0 {
            return Err(ReelError::InvalidConfig(format!(
                "timeline.tail_buffer_seconds must be non-negative, got {}",
                self.tail_buffer_seconds
            )));
        }
        let shortest = self
            .intro_frames()
            .min(self.module_frames())
            .min(self.summary_frames());
        if self.handle_frames >= shortest {
            return Err(ReelError::InvalidConfig(format!(
                "timeline.handle_frames ({}) must be shorter than the shortest scene ({} frames)",
                self.handle_frames, shortest
            )));
        }
        Ok(())
    }
}

/// Output raster handed to the renderer.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Shape the upstream validator expects from a generated storyboard.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StoryboardRules {
    /// Enforce the exact counts below; the planner itself never needs them.
    pub strict_counts: bool,
    pub module_count: usize,
    pub overview_count: usize,
}

impl Default for StoryboardRules {
    fn default() -> Self {
        Self {
            strict_counts: true,
            module_count: 3,
            overview_count: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TtsConfig {
    pub base_url: String,
    pub voice_id: String,
    pub model_id: String,
    pub api_key_env: String,
    /// Silence left between consecutive narration clips.
    pub gap_seconds: f64,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.elevenlabs.io".to_string(),
            voice_id: "21m00Tcm4TlvDq8ikWAM".to_string(),
            model_id: "eleven_multilingual_v2".to_string(),
            api_key_env: "ELEVENLABS_API_KEY".to_string(),
            gap_seconds: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VideoGenConfig {
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
    pub clip_seconds: u32,
    pub poll_interval_ms: u64,
    pub timeout_secs: u64,
}

impl Default for VideoGenConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://api.openai.com".to_string(),
            model: "sora-2".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            clip_seconds: 4,
            poll_interval_ms: 5_000,
            timeout_secs: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub tts: TtsConfig,
    #[serde(default)]
    pub video: VideoGenConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ResourcesConfig {
    pub cache_dir: String,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            cache_dir: "~/.policyreel/cache".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct ReelConfig {
    #[serde(default)]
    pub timeline: TimelineConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub storyboard: StoryboardRules,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub resources: ResourcesConfig,
}

impl ReelConfig {
    pub fn load_from_file(path: &Path) -> ReelResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ReelConfig = toml::from_str(&contents)
            .map_err(|e| ReelError::config_file(e.to_string(), path))?;
        config.timeline.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> ReelResult<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ReelError::config_file(e.to_string(), path))?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_frame_lengths() {
        let cfg = TimelineConfig::default();
        assert_eq!(cfg.title_card_frames(), 60);
        assert_eq!(cfg.intro_frames(), 120);
        assert_eq!(cfg.module_frames(), 135);
        assert_eq!(cfg.summary_frames(), 150);
        assert_eq!(cfg.tail_buffer_frames(), 30);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_fps() {
        let cfg = TimelineConfig {
            fps: 0.0,
            ..TimelineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_handle_longer_than_scene() {
        // At 2fps the intro is 8 frames, shorter than the 12 frame handle.
        let cfg = TimelineConfig {
            fps: 2.0,
            ..TimelineConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("handle_frames"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let raw = r#"
            [timeline]
            fps = 60.0

            [providers.tts]
            gap_seconds = 0.0
        "#;
        let cfg: ReelConfig = toml::from_str(raw).unwrap();
        assert_eq!(cfg.timeline.fps, 60.0);
        assert_eq!(cfg.timeline.handle_frames, 12);
        assert_eq!(cfg.timeline.module_frames(), 270);
        assert_eq!(cfg.providers.tts.gap_seconds, 0.0);
        assert_eq!(cfg.providers.tts.api_key_env, "ELEVENLABS_API_KEY");
        assert_eq!(cfg.output.width, 1920);
    }

    #[test]
    fn test_config_roundtrip_through_file() {
        let dir = std::env::temp_dir().join(format!("policyreel_config_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);

        let mut cfg = ReelConfig::default();
        cfg.timeline.handle_frames = 8;
        cfg.providers.video.enabled = true;
        cfg.save_to_file(&path).unwrap();

        let loaded = ReelConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, cfg);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
