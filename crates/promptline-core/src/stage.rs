//! Stage Runner: one progress notification, one generation call.
use std::sync::Arc;

use crate::agent::AgentSpec;
use crate::context::{ProgressEvent, ProgressSink};
use crate::data_model::{Attachment, StageResult};
use crate::generation::{GenerationClient, GenerationError, GenerationRequest};

pub struct StageRunner {
    client: Arc<dyn GenerationClient>,
}

impl StageRunner {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self { client }
    }

    /// Run one stage. Failures from the client are returned unchanged.
    pub async fn run_stage(
        &self,
        stage_key: &str,
        spec: &AgentSpec,
        prompt: String,
        attachments: &[Attachment],
        position: (usize, usize),
        progress: &dyn ProgressSink,
    ) -> Result<StageResult, GenerationError> {
        let (index, total) = position;
        progress.notify(&ProgressEvent {
            stage_key: stage_key.to_string(),
            index,
            total,
            message: format!("[{}/{}] {}: working...", index + 1, total, spec.role),
        });

        let request = GenerationRequest::for_agent(spec, prompt, attachments);
        let text = self.client.generate(request).await?;

        Ok(StageResult {
            stage_key: stage_key.to_string(),
            text,
        })
    }
}
