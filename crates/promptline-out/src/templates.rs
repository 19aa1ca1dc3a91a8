//! Prompt template files.
//!
//! A templates file is YAML with a version and named handlebars templates:
//!
//! ```yaml
//! version: "1.0"
//! templates:
//!   instagram.content:
//!     description: Content analysis of a set of posts
//!     template: "Analyze the following posts: {{input}}"
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::OutputError;

/// Prompt set compiled into the binary.
pub const BUILTIN_PROMPTS: &str = include_str!("../templates/prompts.yaml");

#[derive(Debug, Clone, Deserialize)]
pub struct TemplatesFile {
    pub version: String,
    pub templates: BTreeMap<String, Template>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Template {
    pub description: String,
    pub template: String,
}

impl TemplatesFile {
    pub fn builtin() -> Result<Self, OutputError> {
        Self::from_yaml(BUILTIN_PROMPTS)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, OutputError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            OutputError::Template(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, OutputError> {
        serde_yaml::from_str(yaml)
            .map_err(|e| OutputError::Template(format!("invalid templates YAML: {}", e)))
    }

    /// Overlay `other` on top of `self`; templates with the same id are replaced.
    pub fn merge(mut self, other: TemplatesFile) -> Self {
        self.templates.extend(other.templates);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn list_templates(&self) -> Vec<&str> {
        self.templates.keys().map(|s| s.as_str()).collect()
    }
}
