//! REST prompt-planning adapter.
//!
//! Sends the transcript to a text-generation endpoint and splits the answer
//! into one prompt line per scene.

use std::time::Duration;

use serde_json::{json, Value};
use shorts_common::{classify_http_status, ProviderError};
use tracing::debug;

use crate::PromptPlanner;

/// Settings for the prompt-planning endpoint.
#[derive(Debug, Clone)]
pub struct RestPlannerConfig {
    /// Endpoint accepting a JSON instruction and answering `{"text": ...}`.
    pub endpoint: String,
    pub api_key: String,
    /// Aesthetic directive woven into the instruction.
    pub style: String,
    pub timeout: Duration,
}

impl RestPlannerConfig {
    #[must_use]
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            endpoint,
            api_key,
            style: "vibrant, high-contrast photographic".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Derives scene prompt lines from a transcript via a text endpoint.
pub struct RestPromptPlanner {
    config: RestPlannerConfig,
    client: reqwest::blocking::Client,
}

impl RestPromptPlanner {
    pub fn new(config: RestPlannerConfig) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Fatal(format!("http client setup failed: {e}")))?;
        Ok(Self { config, client })
    }

    fn instruction(&self, transcript: &str, scenes: usize) -> String {
        format!(
            "Based on this transcript:\n{transcript}\n\n\
             Generate exactly {scenes} distinct visual scene prompts for a short \
             vertical video. Style: {}. If a key number, statistic, or important \
             fact is mentioned, append it at the end of the prompt in this format: \
             [TEXT: your text here]. Output ONLY the prompts, one per line, \
             without numbering.",
            self.config.style
        )
    }
}

impl PromptPlanner for RestPromptPlanner {
    fn plan(&self, transcript: &str, scenes: usize) -> Result<Vec<String>, ProviderError> {
        debug!(
            "planning {} scene prompt(s) from {} transcript chars",
            scenes,
            transcript.len()
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&json!({ "prompt": self.instruction(transcript, scenes) }))
            .send()
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    ProviderError::Transient(format!("planner endpoint unreachable: {e}"))
                } else {
                    ProviderError::Fatal(format!("planner request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(classify_http_status(status.as_u16(), &body));
        }

        let body: Value = response
            .json()
            .map_err(|e| ProviderError::Fatal(format!("planner answered non-JSON: {e}")))?;
        let text = body
            .get("text")
            .and_then(Value::as_str)
            .ok_or_else(|| ProviderError::Fatal("planner answer missing 'text'".to_string()))?;

        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }
}
