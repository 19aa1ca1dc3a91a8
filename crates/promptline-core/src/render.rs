//! Prompt Renderer contract.
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown template: {0}")]
    UnknownTemplate(String),
    #[error("render failed: {0}")]
    Render(String),
}

/// Pure template + data → prompt text. Deterministic for equal inputs.
pub trait PromptRenderer: Send + Sync {
    fn render(&self, template_id: &str, data: &Value) -> Result<String, RenderError>;

    fn has_template(&self, template_id: &str) -> bool;
}
