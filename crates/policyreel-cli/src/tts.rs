//! Narration synthesis against an ElevenLabs-compatible `with-timestamps`
//! endpoint. Audio is cached by content under the resources cache dir and
//! copied into the output directory.

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use base64::Engine;
use policyreel_core::TtsConfig;
use policyreel_timeline::{NarrationClip, NarrationUnit};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::providers;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Decoded speech for one narration unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Speech {
    pub audio: Vec<u8>,
    pub duration_seconds: f64,
}

#[derive(Debug, Deserialize)]
struct TimestampedAudio {
    audio_base64: String,
    alignment: Option<Alignment>,
}

#[derive(Debug, Deserialize)]
struct Alignment {
    #[serde(default)]
    character_end_times_seconds: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedSpeech {
    duration_seconds: f64,
}

pub struct TtsClient {
    client: Client,
    base_url: String,
    voice_id: String,
    model_id: String,
    api_key: String,
}

impl TtsClient {
    pub fn from_config(config: &TtsConfig) -> Result<Self> {
        let api_key = providers::api_key(&config.api_key_env, "narration TTS")?;
        Self::new(config, api_key)
    }

    pub fn new(config: &TtsConfig, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: providers::http_client(REQUEST_TIMEOUT)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            voice_id: config.voice_id.clone(),
            model_id: config.model_id.clone(),
            api_key: api_key.into(),
        })
    }

    fn cache_key(&self, text: &str) -> String {
        providers::sha256_hex(&format!(
            "elevenlabs_tts_ts|base_url={}|voice_id={}|model_id={}|text={}",
            self.base_url, self.voice_id, self.model_id, text
        ))
    }

    pub fn synthesize(&self, text: &str) -> Result<Speech> {
        let url = format!(
            "{}/v1/text-to-speech/{}/with-timestamps",
            self.base_url, self.voice_id
        );
        let body = json!({
            "text": text,
            "model_id": self.model_id,
            "output_format": "mp3_44100_128",
        });

        let res = providers::send_with_retries("ElevenLabs TTS", || {
            self.client
                .post(&url)
                .header("xi-api-key", &self.api_key)
                .json(&body)
        })?;
        let raw = res.text().context("failed to read TTS response body")?;
        parse_timestamped_audio(&raw)
    }

    /// Like [`TtsClient::synthesize`], reusing a cached result for identical
    /// voice, model and text.
    pub fn synthesize_cached(&self, text: &str, cache_root: &Path) -> Result<Speech> {
        let dir = cache_root.join("tts").join("elevenlabs");
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create TTS cache dir: {}", dir.display()))?;
        let key = self.cache_key(text);
        let audio_path = dir.join(format!("{}.mp3", key));
        let meta_path = dir.join(format!("{}.json", key));

        if audio_path.exists() && meta_path.exists() {
            let meta = std::fs::read_to_string(&meta_path)
                .with_context(|| format!("failed to read TTS cache: {}", meta_path.display()))?;
            if let Ok(cached) = serde_json::from_str::<CachedSpeech>(&meta) {
                let audio = std::fs::read(&audio_path).with_context(|| {
                    format!("failed to read cached audio: {}", audio_path.display())
                })?;
                tracing::debug!(key = %key, "TTS cache hit");
                return Ok(Speech {
                    audio,
                    duration_seconds: cached.duration_seconds,
                });
            }
        }

        let speech = self.synthesize(text)?;
        std::fs::write(&audio_path, &speech.audio)
            .with_context(|| format!("failed to write TTS cache: {}", audio_path.display()))?;
        let meta = serde_json::to_string(&CachedSpeech {
            duration_seconds: speech.duration_seconds,
        })?;
        std::fs::write(&meta_path, meta)
            .with_context(|| format!("failed to write TTS cache: {}", meta_path.display()))?;
        Ok(speech)
    }
}

/// Decode the audio payload; the clip length is the end time of the last
/// spoken character.
fn parse_timestamped_audio(raw: &str) -> Result<Speech> {
    let parsed: TimestampedAudio =
        serde_json::from_str(raw).context("TTS response is not timestamped audio JSON")?;
    let audio = base64::engine::general_purpose::STANDARD
        .decode(parsed.audio_base64.trim())
        .context("TTS audio is not valid base64")?;
    let duration_seconds = parsed
        .alignment
        .and_then(|a| a.character_end_times_seconds.last().copied())
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| anyhow!("TTS response has no character timing"))?;

    Ok(Speech {
        audio,
        duration_seconds,
    })
}

/// Synthesize every narration unit in order and write the audio to
/// `out_dir/narration_NN.mp3`. The returned clips carry paths relative to
/// `out_dir`.
pub fn synthesize_narration(
    tts: &TtsClient,
    units: &[NarrationUnit],
    cache_root: &Path,
    out_dir: &Path,
) -> Result<Vec<NarrationClip>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output dir: {}", out_dir.display()))?;

    let mut clips = Vec::with_capacity(units.len());
    for (i, unit) in units.iter().enumerate() {
        if unit.text.trim().is_empty() {
            bail!("narration for {} ({}) is empty", unit.kind, i);
        }
        let speech = tts
            .synthesize_cached(&unit.text, cache_root)
            .with_context(|| format!("failed to synthesize narration for {}", unit.kind))?;

        let file_name = format!("narration_{:02}.mp3", i);
        let path = out_dir.join(&file_name);
        std::fs::write(&path, &speech.audio)
            .with_context(|| format!("failed to write narration: {}", path.display()))?;

        tracing::info!(
            scene = %unit.kind,
            seconds = speech.duration_seconds,
            "synthesized narration"
        );
        clips.push(NarrationClip {
            text: unit.text.clone(),
            audio_ref: file_name,
            duration_seconds: speech.duration_seconds,
        });
    }
    Ok(clips)
}
