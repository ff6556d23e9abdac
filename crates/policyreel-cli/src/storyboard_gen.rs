//! Policy text to storyboard via an OpenAI-compatible chat endpoint.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use policyreel_core::{LlmConfig, StoryboardRules};
use policyreel_ir::validate::validate_storyboard;
use policyreel_ir::{Storyboard, StoryboardBuilder};
use serde_json::{json, Value};

use crate::providers;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Generate a storyboard for `policy_text`. Never fails: any provider,
/// parse or validation error logs a warning and yields the static fallback.
pub fn generate_storyboard(
    policy_text: &str,
    language: &str,
    llm: &LlmConfig,
    rules: &StoryboardRules,
) -> Storyboard {
    let attempt = providers::api_key(&llm.api_key_env, "storyboard generation")
        .and_then(|key| request_storyboard(&llm.base_url, &llm.model, &key, policy_text, language, rules));

    match attempt {
        Ok(storyboard) => {
            tracing::info!(
                title = %storyboard.title,
                modules = storyboard.modules.len(),
                "generated storyboard"
            );
            storyboard
        }
        Err(e) => {
            tracing::warn!("storyboard generation failed, using fallback: {:#}", e);
            fallback_storyboard(language)
        }
    }
}

fn request_storyboard(
    base_url: &str,
    model: &str,
    api_key: &str,
    policy_text: &str,
    language: &str,
    rules: &StoryboardRules,
) -> Result<Storyboard> {
    let client = providers::http_client(REQUEST_TIMEOUT)?;
    let url = format!("{}/v1/chat/completions", base_url.trim_end_matches('/'));

    let body = json!({
        "model": model,
        "response_format": { "type": "json_object" },
        "temperature": 0.4,
        "messages": [
            { "role": "system", "content": system_prompt(language, rules) },
            { "role": "user", "content": policy_text },
        ],
    });

    let res = providers::send_with_retries("storyboard completion", || {
        client.post(&url).bearer_auth(api_key).json(&body)
    })?;
    let raw = res.text().context("failed to read completion body")?;
    parse_completion(&raw, rules)
}

fn system_prompt(language: &str, rules: &StoryboardRules) -> String {
    let counts = if rules.strict_counts {
        format!(
            "Use exactly {} overview points and exactly {} modules.",
            rules.overview_count, rules.module_count
        )
    } else {
        "Use a short overview and a handful of modules.".to_string()
    };
    format!(
        "You turn workplace policy documents into short employee training videos. \
         Respond with a single JSON object with keys: title (string), language (string), \
         intro (string), overview (array of strings), modules (array of objects with \
         title and points), summary (string), quiz (array of objects with question, \
         answers and correctAnswerIndex). {} Write every field in language '{}'.",
        counts, language
    )
}

/// Pull the storyboard out of a chat-completion response and validate it.
fn parse_completion(raw: &str, rules: &StoryboardRules) -> Result<Storyboard> {
    let value: Value = serde_json::from_str(raw).context("completion is not JSON")?;
    let content = value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("completion has no message content"))?;

    let storyboard: Storyboard = serde_json::from_str(strip_code_fence(content))
        .context("message content is not a storyboard")?;

    validate_storyboard(&storyboard, rules).map_err(|errors| {
        let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        anyhow!("generated storyboard is invalid:\n  {}", msgs.join("\n  "))
    })?;
    Ok(storyboard)
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Generic storyboard used whenever generation fails. Shaped to pass the
/// default storyboard rules.
pub fn fallback_storyboard(language: &str) -> Storyboard {
    StoryboardBuilder::new("Workplace Policy Essentials")
        .language(language)
        .intro("Welcome. This short training walks through the policy that applies to your work.")
        .overview("Why the policy exists")
        .overview("What is expected of you")
        .overview("Where to get help")
        .module(
            "Purpose and scope",
            &[
                "The policy applies to every employee and contractor",
                "It protects people, customers and the company",
            ],
        )
        .module(
            "Your responsibilities",
            &[
                "Read and follow the policy in your daily work",
                "Ask your manager when something is unclear",
            ],
        )
        .module(
            "Reporting concerns",
            &[
                "Report possible violations promptly",
                "Reports are handled confidentially and without retaliation",
            ],
        )
        .summary("Follow the policy, ask when unsure, and speak up when something looks wrong.")
        .quiz(
            "What should you do if part of the policy is unclear?",
            &["Ignore it", "Ask your manager", "Guess"],
            1,
        )
        .build()
}
