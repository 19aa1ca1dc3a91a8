use serde::{Deserialize, Serialize};

/// Model ids used by the catalog, one per provider family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelDefaults {
    pub gemini: String,
    pub openai: String,
    pub anthropic: String,
    /// Search model used for competitor discovery
    pub discovery: String,
}

impl Default for ModelDefaults {
    fn default() -> Self {
        Self {
            gemini: "gemini-2.0-flash-exp".to_string(),
            openai: "gpt-4o".to_string(),
            anthropic: "claude-3-5-sonnet-20240620".to_string(),
            discovery: "sonar-pro".to_string(),
        }
    }
}

impl ModelDefaults {
    /// Every model id the catalog may call.
    pub fn all(&self) -> [&str; 4] {
        [&self.gemini, &self.openai, &self.anthropic, &self.discovery]
    }
}
