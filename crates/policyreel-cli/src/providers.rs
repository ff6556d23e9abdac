use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use policyreel_core::ReelConfig;
use reqwest::blocking::{Client, RequestBuilder, Response};
use sha2::{Digest, Sha256};

const MAX_RETRIES: usize = 3;
const BACKOFF_MS: u64 = 250;

/// Read a provider API key from the environment variable named in config.
pub fn api_key(env_name: &str, purpose: &str) -> Result<String> {
    match std::env::var(env_name) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(anyhow!("{} is not set (needed for {})", env_name, purpose)),
    }
}

pub fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| anyhow!(e).context("failed to build HTTP client"))
}

/// Send a request, retrying transport errors and 5xx responses with a linear
/// backoff. 4xx responses are returned as errors immediately.
pub fn send_with_retries(
    what: &str,
    build: impl Fn() -> RequestBuilder,
) -> Result<Response> {
    let mut last_err: Option<anyhow::Error> = None;
    for attempt in 0..MAX_RETRIES {
        match build().send() {
            Ok(res) if res.status().is_success() => return Ok(res),
            Ok(res) => {
                let status = res.status();
                let text = res.text().unwrap_or_default();
                let err = anyhow!("{} failed: {}: {}", what, status, text);
                if !status.is_server_error() {
                    return Err(err);
                }
                last_err = Some(err);
            }
            Err(e) => {
                last_err = Some(anyhow!(e).context(format!("{} request failed", what)));
            }
        }
        if attempt + 1 < MAX_RETRIES {
            let ms = BACKOFF_MS.saturating_mul((attempt + 1) as u64);
            std::thread::sleep(Duration::from_millis(ms));
        }
    }
    Err(last_err.unwrap_or_else(|| anyhow!("{} request failed", what)))
}

pub fn resolve_cache_root(config: &ReelConfig) -> Result<PathBuf> {
    expand_tilde(&config.resources.cache_dir)
}

pub fn expand_tilde(path: &str) -> Result<PathBuf> {
    if path == "~" || path.starts_with("~/") {
        let home = dirs::home_dir().ok_or_else(|| anyhow!("failed to resolve home dir"))?;
        if path == "~" {
            return Ok(home);
        }
        return Ok(home.join(path.trim_start_matches("~/")));
    }
    Ok(PathBuf::from(path))
}

pub fn sha256_hex(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
