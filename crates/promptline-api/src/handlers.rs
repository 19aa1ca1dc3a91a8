//! Route handlers.
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use promptline_out::records_to_csv;
use promptline_sources::{
    AccessRequest, CompetitorFinder, DiscoveryQuery, DocumentTrigger, PostSummary, RequestedAccess,
    SourceError,
};
use promptline_stages::{CompetitorIntelInput, InstagramPostsInput, DISCOVERY_TEMPLATE};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::runs::{self, RunRequest};
use crate::AppState;

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "pipelines": state.catalog.names(),
        "templates": state.renderer.list_templates().len(),
    }))
}

pub async fn list_pipelines(State(state): State<AppState>) -> Json<Value> {
    Json(runs::describe(&state.catalog))
}

pub async fn run_pipeline(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<RunRequest>,
) -> Result<Json<runs::RunResponse>, ApiError> {
    let (def, input) = runs::prepare_request(&state.catalog, &name, request)?;
    tracing::info!(pipeline = %name, stages = def.stages.len(), "run requested");
    let response = runs::execute(&state, def, input).await?;
    Ok(Json(response))
}

/// Table records in, CSV out.
pub async fn reports_csv(Json(records): Json<Vec<Value>>) -> Result<impl IntoResponse, ApiError> {
    let csv = records_to_csv(&records)?;
    Ok(([(header::CONTENT_TYPE, CSV_CONTENT_TYPE)], csv))
}

#[derive(Debug, Deserialize)]
pub struct InstagramReportRequest {
    pub handle: String,
    /// Also run the instagram-analysis pipeline over the posts
    #[serde(default)]
    pub analyze: bool,
}

pub async fn instagram_report(
    State(state): State<AppState>,
    Json(request): Json<InstagramReportRequest>,
) -> Result<Json<Value>, ApiError> {
    let webhook = state
        .webhook
        .clone()
        .ok_or_else(|| ApiError::NotConfigured("webhook".to_string()))?;

    let posts = webhook.fetch_instagram_report(&request.handle).await?;
    let summary = PostSummary::of(&posts);
    let records: Vec<Value> = posts
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()
        .map_err(|e| SourceError::Malformed(e.to_string()))?;
    let csv = records_to_csv(&records)?;

    let analysis = if request.analyze {
        let input = InstagramPostsInput {
            handle: Some(request.handle.clone()),
            posts: records.clone(),
        };
        let (def, input) = runs::prepare_typed(&state.catalog, input)?;
        Some(runs::execute(&state, def, input).await?)
    } else {
        None
    };

    Ok(Json(json!({
        "handle": request.handle,
        "posts": records,
        "summary": summary,
        "csv": csv,
        "analysis": analysis,
    })))
}

#[derive(Debug, Deserialize)]
pub struct DiscoverRequest {
    #[serde(flatten)]
    pub query: DiscoveryQuery,
    /// Also run competitor-intel over the extracted profiles
    #[serde(default)]
    pub analyze: bool,
}

pub async fn competitors_discover(
    State(state): State<AppState>,
    Json(request): Json<DiscoverRequest>,
) -> Result<Json<Value>, ApiError> {
    let model_id = state.settings.models.discovery.clone();
    if !state.client.supports(&model_id) {
        return Err(ApiError::NotConfigured(format!("discovery model {}", model_id)));
    }
    let firecrawl = state
        .firecrawl
        .clone()
        .ok_or_else(|| ApiError::NotConfigured("firecrawl".to_string()))?;

    let finder = CompetitorFinder::new(
        state.client.clone(),
        state.renderer.clone(),
        DISCOVERY_TEMPLATE,
        model_id,
    );
    let urls = finder.find(&request.query).await?;
    if urls.is_empty() {
        return Err(SourceError::Extraction("no competitor URLs found".to_string()).into());
    }

    let profiles = firecrawl.extract_all(&urls).await?;

    let analysis = if request.analyze {
        let competitors: Vec<Value> = profiles
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<_, _>>()
            .map_err(|e| SourceError::Malformed(e.to_string()))?;
        let (def, input) = runs::prepare_typed(&state.catalog, CompetitorIntelInput { competitors })?;
        Some(runs::execute(&state, def, input).await?)
    } else {
        None
    };

    Ok(Json(json!({
        "urls": urls,
        "profiles": profiles,
        "analysis": analysis,
    })))
}

pub async fn webhook_document(
    State(state): State<AppState>,
    Json(trigger): Json<DocumentTrigger>,
) -> Result<Json<Value>, ApiError> {
    let webhook = state
        .webhook
        .clone()
        .ok_or_else(|| ApiError::NotConfigured("webhook".to_string()))?;
    webhook.trigger_document(&trigger).await?;
    Ok(Json(json!({ "status": "accepted", "nombre_archivo": trigger.nombre_archivo })))
}

#[derive(Debug, Deserialize)]
pub struct AccessBody {
    pub email: String,
    #[serde(default)]
    pub accesos_solicitados: RequestedAccess,
}

pub async fn webhook_access(
    State(state): State<AppState>,
    Json(body): Json<AccessBody>,
) -> Result<Json<Value>, ApiError> {
    let webhook = state
        .webhook
        .clone()
        .ok_or_else(|| ApiError::NotConfigured("webhook".to_string()))?;
    let request = AccessRequest::new(body.email, body.accesos_solicitados);
    webhook.request_access(&request).await?;
    Ok(Json(json!({
        "status": "accepted",
        "granted": request.accesos_solicitados.granted(),
    })))
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        ),
        Err(e) => {
            tracing::error!(error = %e, "metrics encoding failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
                String::new(),
            )
        }
    }
}
