//! Optional pattern enrichment via an external text-generation service.
//!
//! The enricher only ever fills `PatternResult::ai_summary`. Failures are
//! returned to the pipeline, which logs and drops them; they never reach a
//! report's error list and never touch numeric results.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use signallab_core::{Candle, PatternResult};

use crate::config::EnrichmentConfig;

/// Longest summary attached to a pattern result, in characters.
pub const MAX_SUMMARY_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("enrichment disabled: {0}")]
    Disabled(String),

    #[error("request failed: {0}")]
    Http(String),

    #[error("service returned HTTP {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// A best-effort source of one-line pattern summaries.
pub trait PatternEnricher: Send + Sync {
    fn name(&self) -> &str;

    /// Describe `pattern` for the given candles.
    fn summarize(&self, candles: &[Candle], pattern: &PatternResult)
        -> Result<String, EnrichmentError>;
}

/// Clip to `MAX_SUMMARY_CHARS` on a character boundary.
pub fn truncate_summary(text: &str) -> String {
    text.trim().chars().take(MAX_SUMMARY_CHARS).collect()
}

// ── OpenAI-compatible chat completions ───────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Enricher backed by a chat-completions endpoint.
pub struct ChatEnricher {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl ChatEnricher {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EnrichmentError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EnrichmentError::Http(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    /// Build from config. `Disabled` when switched off or no key is available.
    pub fn from_config(config: &EnrichmentConfig) -> Result<Self, EnrichmentError> {
        if !config.enabled {
            return Err(EnrichmentError::Disabled("[enrichment] enabled = false".into()));
        }
        let api_key = config.api_key().ok_or_else(|| {
            EnrichmentError::Disabled(format!("${} is not set", config.api_key_env))
        })?;
        Self::new(
            config.endpoint.clone(),
            config.model.clone(),
            api_key,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn prompt(candles: &[Candle], pattern: &PatternResult) -> String {
        let tail: Vec<String> = candles
            .iter()
            .rev()
            .take(2)
            .rev()
            .map(|c| format!("O {:.4} H {:.4} L {:.4} C {:.4}", c.open, c.high, c.low, c.close))
            .collect();
        format!(
            "Last two candles: {}. Detected pattern: {} (strength {:.2}). \
             Describe what this pattern suggests in one short sentence.",
            tail.join(" | "),
            pattern.pattern,
            pattern.strength
        )
    }
}

impl PatternEnricher for ChatEnricher {
    fn name(&self) -> &str {
        &self.model
    }

    fn summarize(
        &self,
        candles: &[Candle],
        pattern: &PatternResult,
    ) -> Result<String, EnrichmentError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: "You are a concise candlestick-pattern analyst.".into(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: Self::prompt(candles, pattern),
                },
            ],
            max_tokens: 80,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| EnrichmentError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(EnrichmentError::Status(status.as_u16()));
        }

        let body: ChatResponse = resp
            .json()
            .map_err(|e| EnrichmentError::Malformed(e.to_string()))?;
        let text = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| EnrichmentError::Malformed("no choices in response".into()))?;

        let summary = truncate_summary(&text);
        if summary.is_empty() {
            return Err(EnrichmentError::Malformed("empty completion".into()));
        }
        Ok(summary)
    }
}
