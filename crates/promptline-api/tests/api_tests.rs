use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use promptline_api::{create_app, AppState, Settings};
use promptline_core::{GenerationClient, GenerationError, GenerationRequest};
use promptline_out::TemplateRenderer;
use promptline_sources::{FirecrawlClient, WebhookClient};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TABLE: &str = "| Company | Pricing |\n|---|---|\n| Rival | $9 |\n| Other | Free |";

/// Answers every model; `fail` makes every call an auth failure.
#[derive(Default)]
struct ScriptedClient {
    fail: bool,
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        if self.fail {
            return Err(GenerationError::Auth("invalid key sk-live-123".to_string()));
        }
        Ok(self
            .reply
            .clone()
            .unwrap_or_else(|| format!("{} says hi", request.model_id)))
    }
}

fn state_with(client: ScriptedClient) -> AppState {
    AppState::new(
        Settings::default(),
        Arc::new(client),
        TemplateRenderer::builtin().unwrap(),
    )
    .unwrap()
}

fn app(client: ScriptedClient) -> Router {
    create_app(state_with(client))
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health_reports_version_and_catalog() {
    let (status, body) = send_json(app(ScriptedClient::default()), "GET", "/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["pipelines"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_pipelines_list_includes_stages() {
    let (status, body) = send_json(app(ScriptedClient::default()), "GET", "/v1/pipelines", None).await;
    assert_eq!(status, StatusCode::OK);

    let trends = body["pipelines"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "startup-trends")
        .unwrap();
    let stages = trends["stages"].as_array().unwrap();
    assert_eq!(stages.len(), 3);
    assert_eq!(stages[0]["uses_previous"], false);
    assert_eq!(stages[1]["uses_previous"], true);
}

#[tokio::test]
async fn test_unknown_pipeline_is_404() {
    let (status, body) = send_json(
        app(ScriptedClient::default()),
        "POST",
        "/v1/pipelines/horoscope/run",
        Some(json!({ "input": {} })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_input_is_400_without_generation() {
    let client = Arc::new(ScriptedClient::default());
    let state = AppState::new(
        Settings::default(),
        client.clone(),
        TemplateRenderer::builtin().unwrap(),
    )
    .unwrap();

    let (status, body) = send_json(
        create_app(state),
        "POST",
        "/v1/pipelines/competitor-team/run",
        Some(json!({ "input": { "company": "   " } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INPUT");
    assert!(client.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_generation_failure_hides_provider_detail() {
    let client = ScriptedClient {
        fail: true,
        ..Default::default()
    };
    let (status, body) = send_json(
        app(client),
        "POST",
        "/v1/pipelines/startup-trends/run",
        Some(json!({ "input": "fintech" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "GENERATION");
    assert!(!body["error"].as_str().unwrap().contains("sk-live"));
}

#[tokio::test]
async fn test_run_returns_results_report_and_progress() {
    let state = state_with(ScriptedClient::default());
    let (status, body) = send_json(
        create_app(state.clone()),
        "POST",
        "/v1/pipelines/startup-trends/run",
        Some(json!({ "input": { "topic": "fintech" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pipeline"], "startup-trends");

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[2]["stage_key"], "trend_analysis");
    assert_eq!(body["records"].as_array().unwrap().len(), 3);
    assert!(!body["progress"].as_array().unwrap().is_empty());

    let report = body["report"].as_str().unwrap();
    assert!(report.starts_with("# Startup Trends\n"));
    assert!(report.contains("## Trend Analysis"));
    assert!(body["text_report"].as_str().unwrap().starts_with("STARTUP TRENDS\n"));
    assert!(body.get("table").is_none());

    let (status, bytes) = send(create_app(state), "GET", "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("pipeline=\"startup-trends\""));
    assert!(text.contains("outcome=\"success\""));
}

#[tokio::test]
async fn test_enabled_stages_limit_the_run() {
    let (status, body) = send_json(
        app(ScriptedClient::default()),
        "POST",
        "/v1/pipelines/instagram-analysis/run",
        Some(json!({
            "input": [{ "likes": 3, "caption": "launch day" }],
            "enabled_stages": ["engagement_analysis"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["stage_key"], "engagement_analysis");
}

#[tokio::test]
async fn test_competitor_intel_parses_comparison_table() {
    let client = ScriptedClient {
        reply: Some(TABLE.to_string()),
        ..Default::default()
    };
    let (status, body) = send_json(
        app(client),
        "POST",
        "/v1/pipelines/competitor-intel/run",
        Some(json!({ "input": [{ "company_name": "Rival", "pricing": "$9" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["table"]["headers"], json!(["Company", "Pricing"]));
    assert_eq!(body["table"]["rows"][1], json!(["Other", "Free"]));
}

#[tokio::test]
async fn test_csv_route_writes_union_header() {
    let (status, bytes) = send(
        app(ScriptedClient::default()),
        "POST",
        "/v1/reports/csv",
        Some(json!([{ "a": 1, "b": "x" }, { "b": "y, z", "c": true }])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        "a,b,c\n1,x,\n,\"y, z\",true\n"
    );
}

#[tokio::test]
async fn test_source_routes_need_configuration() {
    let (status, body) = send_json(
        app(ScriptedClient::default()),
        "POST",
        "/v1/instagram/report",
        Some(json!({ "handle": "acme" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "NOT_CONFIGURED");

    let (status, _) = send_json(
        app(ScriptedClient::default()),
        "POST",
        "/v1/competitors/discover",
        Some(json!({ "url": "https://acme.io" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_instagram_report_with_analysis() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("usuario_instagram", "acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { " Cantidad de Likes": 10, " Cantidad de Comentarios": 4, " Primer Comentario": "new drop" },
            { " Cantidad de Likes": 20, " Cantidad de Comentarios": 0, " Primer Comentario": "sale" }
        ])))
        .mount(&server)
        .await;

    let state = state_with(ScriptedClient::default()).with_webhook(WebhookClient::new(server.uri()));
    let (status, body) = send_json(
        create_app(state),
        "POST",
        "/v1/instagram/report",
        Some(json!({ "handle": "@acme", "analyze": true })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["posts"].as_array().unwrap().len(), 2);
    assert_eq!(body["summary"]["total_likes"], 30);
    assert_eq!(body["summary"]["avg_likes"], 15.0);
    let csv = body["csv"].as_str().unwrap();
    assert!(csv.starts_with(
        "username,likes,comments,caption,hashtags,mentions,published_at,url,image_url,is_ad\n"
    ));
    assert!(csv.contains("new drop"));
    assert_eq!(body["analysis"]["pipeline"], "instagram-analysis");
    assert_eq!(body["analysis"]["results"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_webhook_routes_forward_and_validate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "nombre_archivo": "brief.pdf" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let state = state_with(ScriptedClient::default()).with_webhook(WebhookClient::new(server.uri()));

    let (status, body) = send_json(
        create_app(state.clone()),
        "POST",
        "/v1/webhook/document",
        Some(json!({ "documento_url": "/uploads/brief.pdf", "nombre_archivo": "brief.pdf" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "accepted");

    let (status, body) = send_json(
        create_app(state),
        "POST",
        "/v1/webhook/access",
        Some(json!({ "email": "nobody", "accesos_solicitados": { "meta": true } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INPUT");
}

#[tokio::test]
async fn test_discovery_extracts_profiles() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/extract"))
        .and(body_partial_json(json!({ "urls": ["https://rival.io/*"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "status": "completed",
            "data": { "company_name": "Rival", "pricing": "$9" }
        })))
        .mount(&server)
        .await;

    let client = ScriptedClient {
        reply: Some("1. https://rival.io".to_string()),
        ..Default::default()
    };
    let state = state_with(client).with_firecrawl(FirecrawlClient::new("fc-key").with_base_url(server.uri()));

    let (status, body) = send_json(
        create_app(state),
        "POST",
        "/v1/competitors/discover",
        Some(json!({ "description": "AI note taking for lawyers" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["urls"], json!(["https://rival.io"]));
    assert_eq!(body["profiles"][0]["company_name"], "Rival");
    assert_eq!(body["profiles"][0]["marketing_focus"], "N/A");
    assert!(body["analysis"].is_null());
}
