//! Service configuration.
//!
//! Resolved once at start: built-in defaults, then an optional YAML file
//! named by `PROMPTLINE_CONFIG`, then environment variables (a `.env` file is
//! loaded first). Credentials only ever come from the file or environment.

use promptline_llm::ProviderKeys;
use promptline_stages::ModelDefaults;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_PATH_VAR: &str = "PROMPTLINE_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("CONFIG/failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("CONFIG/invalid YAML: {0}")]
    Parse(String),

    #[error("CONFIG/invalid value for {key}: {value}")]
    Invalid { key: String, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Listen address
    pub addr: String,

    pub providers: ProviderKeys,

    pub firecrawl_api_key: Option<String>,

    /// Automation webhook for Instagram reports, documents and access requests
    pub webhook_url: Option<String>,

    /// Prompt templates file overlaid on the built-in prompts
    pub templates_path: Option<PathBuf>,

    pub generation_timeout_secs: u64,

    pub max_input_chars: usize,

    pub models: ModelDefaults,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8787".to_string(),
            providers: ProviderKeys::default(),
            firecrawl_api_key: None,
            webhook_url: None,
            templates_path: None,
            generation_timeout_secs: 120,
            max_input_chars: promptline_core::DEFAULT_MAX_INPUT_CHARS,
            models: ModelDefaults::default(),
        }
    }
}

impl Settings {
    /// Defaults, then the `PROMPTLINE_CONFIG` file, then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let base = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        base.apply_env(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Override fields from environment-style lookups. Blank values are ignored.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("PROMPTLINE_ADDR") {
            self.addr = v;
        }
        let keys = [
            ("GEMINI_API_KEY", &mut self.providers.gemini),
            ("OPENAI_API_KEY", &mut self.providers.openai),
            ("ANTHROPIC_API_KEY", &mut self.providers.anthropic),
            ("PERPLEXITY_API_KEY", &mut self.providers.perplexity),
            ("FIRECRAWL_API_KEY", &mut self.firecrawl_api_key),
            ("PROMPTLINE_WEBHOOK_URL", &mut self.webhook_url),
        ];
        for (key, slot) in keys {
            if let Some(v) = var(key) {
                *slot = Some(v);
            }
        }
        if let Some(v) = var("PROMPTLINE_TEMPLATES") {
            self.templates_path = Some(PathBuf::from(v));
        }
        if let Some(v) = var("PROMPTLINE_GENERATION_TIMEOUT_SECS") {
            self.generation_timeout_secs = parse_number("PROMPTLINE_GENERATION_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = var("PROMPTLINE_MAX_INPUT_CHARS") {
            self.max_input_chars = parse_number("PROMPTLINE_MAX_INPUT_CHARS", &v)?;
        }

        let models = [
            ("PROMPTLINE_MODEL_GEMINI", &mut self.models.gemini),
            ("PROMPTLINE_MODEL_OPENAI", &mut self.models.openai),
            ("PROMPTLINE_MODEL_ANTHROPIC", &mut self.models.anthropic),
            ("PROMPTLINE_MODEL_DISCOVERY", &mut self.models.discovery),
        ];
        for (key, slot) in models {
            if let Some(v) = var(key) {
                *slot = v;
            }
        }

        Ok(self)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    })
}
