//! Background clip generation as fire-and-poll jobs.
//!
//! Each clip slot gets one job. A job moves from `Pending` to exactly one
//! terminal state; the poller owns the timeout and cancellation edges, the
//! backend reports everything else.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use policyreel_core::VideoGenConfig;
use policyreel_ir::{BackgroundClips, ClipSlot, Storyboard};
use reqwest::blocking::Client;
use serde_json::{json, Value};

use crate::providers;

/// Consecutive status errors tolerated before a job is marked failed.
const MAX_STATUS_ERRORS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Succeeded { url: String },
    Failed { reason: String },
    TimedOut,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Pending)
    }
}

/// A video generation provider.
pub trait VideoBackend {
    /// Start a job and return its provider id.
    fn submit(&self, prompt: &str) -> Result<String>;
    fn status(&self, job_id: &str) -> Result<JobState>;
}

/// Shared cancellation flag, checked between polls.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl From<&VideoGenConfig> for PollSettings {
    fn from(config: &VideoGenConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.poll_interval_ms),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Poll `job_id` until it reaches a terminal state.
pub fn poll_job(
    backend: &dyn VideoBackend,
    job_id: &str,
    settings: PollSettings,
    cancel: &CancelToken,
) -> JobState {
    let started = Instant::now();
    let mut status_errors = 0usize;

    loop {
        if cancel.is_cancelled() {
            return JobState::Cancelled;
        }

        match backend.status(job_id) {
            Ok(JobState::Pending) => status_errors = 0,
            Ok(state) => return state,
            Err(e) => {
                status_errors += 1;
                tracing::warn!(job = job_id, attempt = status_errors, "status check failed: {:#}", e);
                if status_errors >= MAX_STATUS_ERRORS {
                    return JobState::Failed {
                        reason: format!("status unavailable: {:#}", e),
                    };
                }
            }
        }

        if started.elapsed() >= settings.timeout {
            return JobState::TimedOut;
        }
        std::thread::sleep(settings.interval);
    }
}

/// Prompt for one clip slot. Clips are silent visual backdrops.
pub fn clip_prompt(storyboard: &Storyboard, slot: ClipSlot) -> String {
    let subject = match slot {
        ClipSlot::Intro => format!("an opening shot introducing \"{}\"", storyboard.title),
        ClipSlot::Module(i) => match storyboard.module(i) {
            Some(m) => format!("a scene illustrating \"{}\"", m.title),
            None => "a neutral office scene".to_string(),
        },
        ClipSlot::Summary => "a calm closing shot of a modern workplace".to_string(),
    };
    format!(
        "Short cinematic background video, {}. Professional corporate training style, \
         soft lighting, slow camera movement, no text, no logos, no people speaking.",
        subject
    )
}

/// Generate one clip per slot, `[intro, module-0, ..., summary]`. Slots that
/// fail, time out or are cancelled become null entries.
pub fn generate_background_clips(
    storyboard: &Storyboard,
    backend: &dyn VideoBackend,
    settings: PollSettings,
    cancel: &CancelToken,
) -> BackgroundClips {
    let slots = ClipSlot::all(storyboard.modules.len());
    let mut clips = Vec::with_capacity(slots.len());

    for slot in slots {
        if cancel.is_cancelled() {
            clips.push(None);
            continue;
        }

        let job_id = match backend.submit(&clip_prompt(storyboard, slot)) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(?slot, "clip submission failed: {:#}", e);
                clips.push(None);
                continue;
            }
        };
        tracing::info!(?slot, job = %job_id, "submitted clip job");

        match poll_job(backend, &job_id, settings, cancel) {
            JobState::Succeeded { url } => {
                tracing::info!(?slot, job = %job_id, "clip ready");
                clips.push(Some(url));
            }
            other => {
                tracing::warn!(?slot, job = %job_id, state = ?other, "clip not generated");
                clips.push(None);
            }
        }
    }

    BackgroundClips::new(clips)
}

/// OpenAI-style `/v1/videos` backend.
pub struct HttpVideoBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    seconds: u32,
    size: String,
}

impl HttpVideoBackend {
    pub fn from_config(config: &VideoGenConfig, width: u32, height: u32) -> Result<Self> {
        let api_key = providers::api_key(&config.api_key_env, "background video generation")?;
        Self::new(config, api_key, width, height)
    }

    pub fn new(config: &VideoGenConfig, api_key: impl Into<String>, width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            client: providers::http_client(Duration::from_secs(60))?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: config.model.clone(),
            seconds: config.clip_seconds,
            size: format!("{}x{}", width, height),
        })
    }

    fn content_url(&self, job_id: &str) -> String {
        format!("{}/v1/videos/{}/content", self.base_url, job_id)
    }
}

impl VideoBackend for HttpVideoBackend {
    fn submit(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/v1/videos", self.base_url);
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "seconds": self.seconds.to_string(),
            "size": self.size,
        });
        let request_id = uuid::Uuid::new_v4().to_string();

        let res = providers::send_with_retries("video submit", || {
            self.client
                .post(&url)
                .bearer_auth(&self.api_key)
                .header("Idempotency-Key", &request_id)
                .json(&body)
        })?;
        let value: Value = res.json().context("video submit response is not JSON")?;
        value
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| anyhow!("video submit response has no job id"))
    }

    fn status(&self, job_id: &str) -> Result<JobState> {
        let url = format!("{}/v1/videos/{}", self.base_url, job_id);
        let res = providers::send_with_retries("video status", || {
            self.client.get(&url).bearer_auth(&self.api_key)
        })?;
        let value: Value = res.json().context("video status response is not JSON")?;
        parse_job_status(&value, || self.content_url(job_id))
    }
}

fn parse_job_status(value: &Value, content_url: impl FnOnce() -> String) -> Result<JobState> {
    let status = value
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("video status response has no status"))?;

    Ok(match status {
        "queued" | "in_progress" | "processing" => JobState::Pending,
        "completed" | "succeeded" => {
            let url = value
                .get("url")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(content_url);
            JobState::Succeeded { url }
        }
        "failed" => JobState::Failed {
            reason: value
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("provider reported failure")
                .to_string(),
        },
        "cancelled" | "canceled" => JobState::Cancelled,
        other => JobState::Failed {
            reason: format!("unknown status '{}'", other),
        },
    })
}
