//! Pipeline configuration loaded from TOML.
//!
//! Every field is defaulted, so an empty file (or no file at all) yields the
//! canonical analysis parameters with enrichment switched off.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use signallab_core::AnalysisParams;

/// Errors from reading or validating a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration: `[analysis]` and `[enrichment]` tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub analysis: AnalysisParams,
    pub enrichment: EnrichmentConfig,
}

/// Settings for the optional pattern-summary service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub enabled: bool,
    /// OpenAI-compatible chat-completions URL.
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "https://api.openai.com/v1/chat/completions".into(),
            model: "gpt-4o-mini".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            timeout_secs: 10,
        }
    }
}

impl EnrichmentConfig {
    /// The API key, if the configured variable is set and non-empty.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

impl PipelineConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analysis
            .validate()
            .map_err(|msg| ConfigError::Invalid(format!("[analysis] {msg}")))?;

        if self.enrichment.enabled {
            if self.enrichment.endpoint.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "[enrichment] endpoint must be set when enabled".into(),
                ));
            }
            if self.enrichment.timeout_secs == 0 {
                return Err(ConfigError::Invalid(
                    "[enrichment] timeout_secs must be >= 1".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("serialize config: {e}"))
    }
}
