//! Data Model: PipelineDef, PipelineInput, PipelineOutput, PipelineRun
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

use crate::agent::AgentSpec;
use crate::error::PipelineError;
use crate::DEFAULT_MAX_INPUT_CHARS;

/// One stage of a pipeline definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDef {
    /// Output key (ex: "content_analysis")
    pub key: String,
    /// Human-readable heading used by reports
    pub title: String,
    /// Prompt template id known to the renderer
    pub template_id: String,
    /// Interpolate the immediately preceding stage's text
    pub uses_previous: bool,
    pub agent: AgentSpec,
}

impl StageDef {
    pub fn new(
        key: impl Into<String>,
        title: impl Into<String>,
        template_id: impl Into<String>,
        agent: AgentSpec,
    ) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            template_id: template_id.into(),
            uses_previous: false,
            agent,
        }
    }

    pub fn chained(mut self) -> Self {
        self.uses_previous = true;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDef {
    pub name: String,
    pub title: String,
    pub stages: Vec<StageDef>,
    pub max_input_chars: usize,
}

impl PipelineDef {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            stages: Vec::new(),
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }

    pub fn stage(mut self, stage: StageDef) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn max_input_chars(mut self, max: usize) -> Self {
        self.max_input_chars = max;
        self
    }

    pub fn stage_keys(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.key.as_str()).collect()
    }

    /// Keep only the listed stages, in definition order.
    ///
    /// The enabled list is decided once, before a run starts. Unknown keys
    /// and an empty selection are input errors.
    pub fn with_enabled<S: AsRef<str>>(mut self, enabled: &[S]) -> Result<Self, PipelineError> {
        let wanted: HashSet<&str> = enabled.iter().map(|k| k.as_ref()).collect();
        let known: HashSet<&str> = self.stages.iter().map(|s| s.key.as_str()).collect();

        let mut unknown: Vec<&str> = wanted.difference(&known).copied().collect();
        if !unknown.is_empty() {
            unknown.sort_unstable();
            return Err(PipelineError::InvalidInput(format!(
                "unknown stages for {}: {}",
                self.name,
                unknown.join(", ")
            )));
        }

        self.stages.retain(|s| wanted.contains(s.key.as_str()));
        if self.stages.is_empty() {
            return Err(PipelineError::InvalidInput(format!(
                "no stages enabled for {}",
                self.name
            )));
        }
        Ok(self)
    }
}

/// Binary attachment forwarded to vision-capable stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// MIME type (ex: "image/png")
    pub media_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            media_type: media_type.into(),
            bytes,
        }
    }
}

/// Caller-supplied payload. Read-only to the pipeline.
#[derive(Debug, Clone, Default)]
pub struct PipelineInput {
    pub data: serde_json::Value,
    pub attachments: Vec<Attachment>,
}

impl PipelineInput {
    pub fn new(data: serde_json::Value) -> Self {
        Self {
            data,
            attachments: Vec::new(),
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResult {
    pub stage_key: String,
    pub text: String,
}

/// Stage results in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipelineOutput {
    results: Vec<StageResult>,
}

impl PipelineOutput {
    pub(crate) fn push(&mut self, result: StageResult) {
        debug_assert!(self.get(&result.stage_key).is_none());
        self.results.push(result);
    }

    pub fn get(&self, stage_key: &str) -> Option<&str> {
        self.results
            .iter()
            .find(|r| r.stage_key == stage_key)
            .map(|r| r.text.as_str())
    }

    pub fn keys(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.stage_key.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StageResult> {
        self.results.iter()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn last(&self) -> Option<&StageResult> {
        self.results.last()
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.results
            .iter()
            .map(|r| (r.stage_key.clone(), r.text.clone()))
            .collect()
    }
}

impl IntoIterator for PipelineOutput {
    type Item = StageResult;
    type IntoIter = std::vec::IntoIter<StageResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage_key: String,
    pub model_id: String,
    pub prompt_hash: String,
    pub prompt_chars: usize,
    pub output_chars: usize,
    pub latency_ms: u64,
}

/// A completed pipeline run. Only successful runs produce one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub pipeline: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub output: PipelineOutput,
    pub records: Vec<StageRecord>,
}

impl PipelineRun {
    pub fn total_latency_ms(&self) -> u64 {
        self.records.iter().map(|r| r.latency_ms).sum()
    }
}
