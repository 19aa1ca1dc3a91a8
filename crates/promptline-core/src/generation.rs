//! Generation Client contract shared by every provider.
use async_trait::async_trait;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::agent::{AgentSpec, ToolCapability};
use crate::data_model::Attachment;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("provider returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("provider returned an empty response")]
    EmptyResponse,

    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("no provider configured for model {0}")]
    UnsupportedModel(String),
}

/// One request to a hosted text or vision model.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model_id: String,
    /// System-level role instructions, in order
    pub instructions: Vec<String>,
    pub prompt: String,
    pub attachments: Vec<Attachment>,
    pub tools: BTreeSet<ToolCapability>,
}

impl GenerationRequest {
    pub fn new(model_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            instructions: Vec::new(),
            prompt: prompt.into(),
            attachments: Vec::new(),
            tools: BTreeSet::new(),
        }
    }

    /// Build the request for an agent. Attachments are only kept for
    /// agents that accept them.
    pub fn for_agent(spec: &AgentSpec, prompt: String, attachments: &[Attachment]) -> Self {
        let attachments = if spec.kind.accepts_attachments() {
            attachments.to_vec()
        } else {
            if !attachments.is_empty() {
                tracing::warn!(
                    role = %spec.role,
                    dropped = attachments.len(),
                    "agent does not accept attachments; dropping them"
                );
            }
            Vec::new()
        };

        Self {
            model_id: spec.model_id.clone(),
            instructions: spec.instructions.clone(),
            prompt,
            attachments,
            tools: spec.tool_capabilities(),
        }
    }

    /// Instructions joined the way providers expect a system prompt.
    pub fn system_prompt(&self) -> Option<String> {
        if self.instructions.is_empty() {
            None
        } else {
            Some(self.instructions.join("\n"))
        }
    }
}

/// A single blocking-from-the-caller's-view call to a hosted model.
///
/// Implementations make exactly one outbound request per call and never
/// retry. On success the returned text is non-empty.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError>;

    /// Whether a model id can be routed by this client.
    fn supports(&self, _model_id: &str) -> bool {
        true
    }
}

/// Reject empty or whitespace-only provider text.
pub fn non_empty(text: String) -> Result<String, GenerationError> {
    if text.trim().is_empty() {
        Err(GenerationError::EmptyResponse)
    } else {
        Ok(text)
    }
}
