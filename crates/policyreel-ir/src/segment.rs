use policyreel_core::{Duration, Timestamp};
use serde::{Deserialize, Serialize};

/// One narration clip produced by the narration-segmentation collaborator.
///
/// Segments are consumed in input order; they are never re-sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Literal narrated text.
    #[serde(default)]
    pub text: String,
    /// Offset from the start of the composition, in seconds.
    pub start: f64,
    /// Length of the clip, in seconds.
    pub duration: f64,
    /// Reference to the audio for this clip.
    #[serde(rename = "url", default)]
    pub audio_ref: String,
}

impl Segment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64, audio_ref: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
            audio_ref: audio_ref.into(),
        }
    }

    pub fn start_time(&self) -> Timestamp {
        Timestamp::from_seconds(self.start)
    }

    pub fn length(&self) -> Duration {
        Duration::from_seconds(self.duration)
    }

    /// End of the clip in seconds.
    pub fn end_seconds(&self) -> f64 {
        self.start + self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_json_uses_url_field() {
        let raw = r#"[{"text": "Hello", "start": 1.5, "duration": 2.25, "url": "audio/0.mp3"}]"#;
        let segs: Vec<Segment> = serde_json::from_str(raw).unwrap();
        assert_eq!(segs[0].audio_ref, "audio/0.mp3");
        assert!((segs[0].end_seconds() - 3.75).abs() < 1e-9);
        assert_eq!(segs[0].start_time().nearest_frame(30.0), 45);
        assert_eq!(segs[0].length().nearest_frames(30.0), 68);

        let back = serde_json::to_value(&segs[0]).unwrap();
        assert_eq!(back["url"], "audio/0.mp3");
    }
}
