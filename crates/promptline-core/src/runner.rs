//! Pipeline Runner: runs stages in order, threading the previous stage's text
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use crate::context::{ProgressSink, RunContext};
use crate::data_model::{PipelineDef, PipelineInput, PipelineOutput, PipelineRun, StageRecord};
use crate::error::PipelineError;
use crate::generation::GenerationClient;
use crate::payload::bounded_json;
use crate::render::PromptRenderer;
use crate::stage::StageRunner;

pub struct PipelineRunner {
    def: PipelineDef,
    stages: StageRunner,
    renderer: Arc<dyn PromptRenderer>,
}

impl PipelineRunner {
    /// Build a runner, rejecting definitions that could not run to completion.
    pub fn new(
        def: PipelineDef,
        client: Arc<dyn GenerationClient>,
        renderer: Arc<dyn PromptRenderer>,
    ) -> Result<Self, PipelineError> {
        if def.stages.is_empty() {
            return Err(PipelineError::Config(format!("pipeline {} has no stages", def.name)));
        }

        let mut seen = HashSet::new();
        for stage in &def.stages {
            if !seen.insert(stage.key.as_str()) {
                return Err(PipelineError::Config(format!(
                    "duplicate stage key {} in {}",
                    stage.key, def.name
                )));
            }
            if !renderer.has_template(&stage.template_id) {
                return Err(PipelineError::Config(format!(
                    "unknown template {} for stage {}",
                    stage.template_id, stage.key
                )));
            }
            if !client.supports(&stage.agent.model_id) {
                return Err(PipelineError::Config(format!(
                    "no provider configured for model {} (stage {})",
                    stage.agent.model_id, stage.key
                )));
            }
        }

        Ok(Self {
            def,
            stages: StageRunner::new(client),
            renderer,
        })
    }

    pub fn definition(&self) -> &PipelineDef {
        &self.def
    }

    /// Render the prompt for stage `index` without calling any provider.
    pub fn render_prompt(
        &self,
        index: usize,
        input: &PipelineInput,
        previous: Option<(&str, &str)>,
    ) -> Result<String, PipelineError> {
        let stage = self.def.stages.get(index).ok_or_else(|| {
            PipelineError::InvalidInput(format!("stage index {index} out of range"))
        })?;
        let data = self.render_data(input, if stage.uses_previous { previous } else { None });
        self.renderer
            .render(&stage.template_id, &data)
            .map_err(|e| PipelineError::Render {
                stage: stage.key.clone(),
                message: e.to_string(),
            })
    }

    /// Run every stage in order. Any failure aborts the run and no partial
    /// output is returned.
    pub async fn run(
        &self,
        input: &PipelineInput,
        progress: &dyn ProgressSink,
    ) -> Result<PipelineRun, PipelineError> {
        let ctx = RunContext::new(&self.def.name);
        let total = self.def.stages.len();
        let mut output = PipelineOutput::default();
        let mut records = Vec::with_capacity(total);

        tracing::info!(run_id = %ctx.run_id, pipeline = %ctx.pipeline, stages = total, "pipeline run started");

        for (index, stage) in self.def.stages.iter().enumerate() {
            let previous_title = index
                .checked_sub(1)
                .map(|i| self.def.stages[i].title.as_str());
            let previous = match (output.last(), previous_title) {
                (Some(result), Some(title)) => Some((title, result.text.as_str())),
                _ => None,
            };

            let prompt = self.render_prompt(index, input, previous)?;
            let prompt_hash = format!("blake3:{}", blake3::hash(prompt.as_bytes()));
            let prompt_chars = prompt.chars().count();

            let start = Instant::now();
            let result = self
                .stages
                .run_stage(
                    &stage.key,
                    &stage.agent,
                    prompt,
                    &input.attachments,
                    (index, total),
                    progress,
                )
                .await
                .map_err(|source| {
                    tracing::error!(run_id = %ctx.run_id, stage = %stage.key, error = %source, "stage failed; aborting run");
                    PipelineError::Generation {
                        stage: stage.key.clone(),
                        source,
                    }
                })?;
            let latency_ms = start.elapsed().as_millis() as u64;

            tracing::debug!(stage = %stage.key, latency_ms, chars = result.text.len(), "stage complete");

            records.push(StageRecord {
                stage_key: stage.key.clone(),
                model_id: stage.agent.model_id.clone(),
                prompt_hash,
                prompt_chars,
                output_chars: result.text.chars().count(),
                latency_ms,
            });
            output.push(result);
        }

        tracing::info!(run_id = %ctx.run_id, pipeline = %ctx.pipeline, "pipeline run finished");

        Ok(PipelineRun {
            run_id: ctx.run_id,
            pipeline: ctx.pipeline,
            started_at: ctx.started_at,
            finished_at: Utc::now(),
            output,
            records,
        })
    }

    fn render_data(&self, input: &PipelineInput, previous: Option<(&str, &str)>) -> Value {
        let mut data = json!({
            "input": bounded_json(&input.data, self.def.max_input_chars),
            "data": input.data,
            "attachment_count": input.attachments.len(),
        });
        if let Some((title, text)) = previous {
            data["previous_title"] = json!(title);
            data["previous"] = json!(text);
        }
        data
    }
}
