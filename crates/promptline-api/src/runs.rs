//! Pipeline runs over HTTP: request decoding, typed input selection and
//! execution with progress capture.
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use promptline_core::{
    Attachment, CollectingProgress, PipelineDef, PipelineError, PipelineInput, PipelineOutput,
    PipelineRunner, StageRecord,
};
use promptline_out::{
    markdown_report, parse_markdown_table, sections, text_report, MarkdownTable, TextReportHeader,
};
use promptline_stages::{
    prepare, Catalog, CatalogInput, CompetitorIntelInput, CompetitorTeamInput, DesignAnalysis,
    DesignReviewInput, InstagramPostsInput, TrendTopicInput, COMPETITOR_INTEL, COMPETITOR_TEAM,
    DESIGN_REVIEW, INSTAGRAM_ANALYSIS, STARTUP_TRENDS,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

/// Stage whose output is a Markdown comparison table.
const COMPARISON_STAGE: &str = "comparison_table";

#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentPayload {
    pub media_type: String,
    pub data_base64: String,
    /// Marks a competitor screenshot in a design review
    #[serde(default)]
    pub competitor: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub input: Value,
    #[serde(default)]
    pub enabled_stages: Option<Vec<String>>,
    #[serde(default)]
    pub attachments: Vec<AttachmentPayload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResponse {
    pub run_id: Uuid,
    pub pipeline: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total_latency_ms: u64,
    pub results: PipelineOutput,
    pub records: Vec<StageRecord>,
    pub progress: Vec<String>,
    pub report: String,
    pub text_report: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<MarkdownTable>,
}

#[derive(Debug, Default, Deserialize)]
struct DesignReviewBody {
    #[serde(default)]
    focus_elements: Vec<String>,
    #[serde(default)]
    context: String,
    #[serde(default)]
    analyses: Option<Vec<DesignAnalysis>>,
}

fn invalid(message: String) -> ApiError {
    ApiError::Pipeline(PipelineError::InvalidInput(message))
}

fn typed<T: DeserializeOwned>(pipeline: &str, value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::BadRequest(format!("invalid input for {}: {}", pipeline, e)))
}

/// Decode base64 payloads into (designs, competitor designs).
pub fn decode_attachments(
    payloads: &[AttachmentPayload],
) -> Result<(Vec<Attachment>, Vec<Attachment>), ApiError> {
    let mut own = Vec::new();
    let mut competitors = Vec::new();
    for (i, payload) in payloads.iter().enumerate() {
        let bytes = general_purpose::STANDARD
            .decode(payload.data_base64.trim())
            .map_err(|e| invalid(format!("attachment {} is not valid base64: {}", i, e)))?;
        let attachment = Attachment::new(payload.media_type.clone(), bytes);
        if payload.competitor {
            competitors.push(attachment);
        } else {
            own.push(attachment);
        }
    }
    Ok((own, competitors))
}

/// Pick the typed input for `name`, validate it and resolve the definition.
pub fn prepare_request(
    catalog: &Catalog,
    name: &str,
    request: RunRequest,
) -> Result<(PipelineDef, PipelineInput), ApiError> {
    if catalog.get(name).is_none() {
        return Err(ApiError::UnknownPipeline(name.to_string()));
    }
    let (designs, competitor_designs) = decode_attachments(&request.attachments)?;
    if name != DESIGN_REVIEW && !request.attachments.is_empty() {
        tracing::warn!(pipeline = name, dropped = request.attachments.len(), "attachments ignored");
    }

    let input = request.input;
    let (def, pipeline_input) = match name {
        INSTAGRAM_ANALYSIS => {
            let typed_input: InstagramPostsInput = match input {
                Value::Array(posts) => InstagramPostsInput { handle: None, posts },
                Value::Null => InstagramPostsInput::default(),
                other => typed(name, other)?,
            };
            prepare(catalog, typed_input)?
        }
        COMPETITOR_TEAM => prepare(catalog, typed::<CompetitorTeamInput>(name, input)?)?,
        STARTUP_TRENDS => {
            let typed_input = match input {
                Value::String(topic) => TrendTopicInput { topic },
                other => typed(name, other)?,
            };
            prepare(catalog, typed_input)?
        }
        DESIGN_REVIEW => {
            let body: DesignReviewBody = match input {
                Value::Null => DesignReviewBody::default(),
                other => typed(name, other)?,
            };
            let typed_input = DesignReviewInput {
                focus_elements: body.focus_elements,
                context: body.context,
                designs,
                competitor_designs,
                analyses: body.analyses.unwrap_or_else(DesignAnalysis::all),
            };
            prepare(catalog, typed_input)?
        }
        COMPETITOR_INTEL => {
            let typed_input = match input {
                Value::Array(competitors) => CompetitorIntelInput { competitors },
                other => typed(name, other)?,
            };
            prepare(catalog, typed_input)?
        }
        other => return Err(ApiError::UnknownPipeline(other.to_string())),
    };

    let def = match request.enabled_stages {
        Some(keys) => def.with_enabled(&keys)?,
        None => def,
    };
    Ok((def, pipeline_input))
}

/// Typed inputs from the source endpoints go straight through `prepare`.
pub fn prepare_typed<I: CatalogInput>(
    catalog: &Catalog,
    input: I,
) -> Result<(PipelineDef, PipelineInput), ApiError> {
    Ok(prepare(catalog, input)?)
}

pub async fn execute(
    state: &AppState,
    def: PipelineDef,
    input: PipelineInput,
) -> Result<RunResponse, ApiError> {
    let pipeline = def.name.clone();
    let runner = PipelineRunner::new(def, state.client.clone(), state.renderer.clone())?;
    let progress = CollectingProgress::new();

    let run = match runner.run(&input, &progress).await {
        Ok(run) => run,
        Err(e) => {
            state.metrics.record_failure(&pipeline, e.code());
            return Err(e.into());
        }
    };
    state.metrics.record_success(&run);

    let def = runner.definition();
    let report_sections = sections(def, &run.output);
    let report = markdown_report(&def.title, &report_sections);
    let text = text_report(&def.title, &text_header(&input.data), &report_sections);
    let table = if pipeline == COMPETITOR_INTEL {
        run.output.get(COMPARISON_STAGE).and_then(parse_markdown_table)
    } else {
        None
    };

    Ok(RunResponse {
        run_id: run.run_id,
        pipeline,
        started_at: run.started_at,
        finished_at: run.finished_at,
        total_latency_ms: run.total_latency_ms(),
        results: run.output,
        records: run.records,
        progress: progress.messages(),
        report,
        text_report: text,
        table,
    })
}

/// Context and focus elements, when the input carries them.
fn text_header(data: &Value) -> TextReportHeader {
    TextReportHeader {
        context: data.get("context").and_then(Value::as_str).map(str::to_string),
        elements: data
            .get("focus_elements")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default(),
    }
}

/// Catalog listing served by `GET /v1/pipelines`.
pub fn describe(catalog: &Catalog) -> Value {
    let pipelines: Vec<Value> = catalog
        .iter()
        .map(|def| {
            let stages: Vec<Value> = def
                .stages
                .iter()
                .map(|s| {
                    json!({
                        "key": s.key,
                        "title": s.title,
                        "uses_previous": s.uses_previous,
                        "model_id": s.agent.model_id,
                        "agent": s.agent.kind,
                    })
                })
                .collect();
            json!({ "name": def.name, "title": def.title, "stages": stages })
        })
        .collect();
    json!({ "pipelines": pipelines })
}
