//! Catalog pipelines built against the built-in prompt templates.

use async_trait::async_trait;
use promptline_core::{
    Attachment, GenerationClient, GenerationError, GenerationRequest, NoProgress, PipelineRunner,
};
use promptline_out::TemplateRenderer;
use promptline_stages::{
    prepare, Catalog, CompetitorTeamInput, DesignAnalysis, DesignReviewInput, TrendTopicInput,
};
use serde_json::json;
use std::sync::{Arc, Mutex};

/// Echoes a short reply and keeps every request.
#[derive(Default)]
struct EchoClient {
    calls: Mutex<Vec<GenerationRequest>>,
}

#[async_trait]
impl GenerationClient for EchoClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(request);
        Ok(format!("answer #{}", calls.len()))
    }
}

impl EchoClient {
    fn requests(&self) -> Vec<GenerationRequest> {
        self.calls.lock().unwrap().clone()
    }
}

fn renderer() -> Arc<TemplateRenderer> {
    Arc::new(TemplateRenderer::builtin().unwrap())
}

#[test]
fn test_every_catalog_pipeline_builds_with_builtin_templates() {
    let catalog = Catalog::default();
    let client = Arc::new(EchoClient::default());
    for def in catalog.iter() {
        let runner = PipelineRunner::new(def.clone(), client.clone(), renderer());
        assert!(runner.is_ok(), "{} failed to build", def.name);
    }
}

#[tokio::test]
async fn test_startup_trends_chains_previous_text() {
    let catalog = Catalog::default();
    let client = Arc::new(EchoClient::default());
    let (def, input) = prepare(&catalog, TrendTopicInput { topic: "climate tech".to_string() }).unwrap();
    let runner = PipelineRunner::new(def, client.clone(), renderer()).unwrap();

    let run = runner.run(&input, &NoProgress).await.unwrap();
    assert_eq!(run.output.keys(), vec!["news_collection", "article_summaries", "trend_analysis"]);

    let requests = client.requests();
    assert_eq!(requests[0].prompt, "Collect recent news on climate tech");
    assert!(requests[1].prompt.contains("answer #1"));
    assert!(requests[2].prompt.contains("answer #2"));
    assert!(!requests[2].prompt.contains("answer #1"));
    assert_eq!(requests[0].model_id, "claude-3-5-sonnet-20240620");
}

#[tokio::test]
async fn test_competitor_team_sends_company_to_every_stage() {
    let catalog = Catalog::default();
    let client = Arc::new(EchoClient::default());
    let input = CompetitorTeamInput {
        company: json!("Acme, handmade soap"),
        competitors: vec!["Lush".to_string(), "Dove".to_string()],
    };
    let (def, input) = prepare(&catalog, input).unwrap();
    let runner = PipelineRunner::new(def, client.clone(), renderer()).unwrap();
    runner.run(&input, &NoProgress).await.unwrap();

    let requests = client.requests();
    assert!(requests[0].prompt.contains("Company: Acme, handmade soap"));
    assert!(requests[0].prompt.contains("Competitors: Lush, Dove"));
    assert!(requests[1].prompt.contains("- Lush\n- Dove"));
    assert!(requests.iter().all(|r| !r.prompt.contains("answer #")));
}

#[tokio::test]
async fn test_design_review_runs_selected_analyses_with_images() {
    let catalog = Catalog::default();
    let client = Arc::new(EchoClient::default());
    let mut input = DesignReviewInput::new(vec![Attachment::new("image/png", vec![1, 2])]);
    input.focus_elements = vec!["Color Scheme".to_string(), "Typography".to_string()];
    input.context = "Checkout page".to_string();
    input.analyses = vec![DesignAnalysis::Ux];

    let (def, input) = prepare(&catalog, input).unwrap();
    let runner = PipelineRunner::new(def, client.clone(), renderer()).unwrap();
    let run = runner.run(&input, &NoProgress).await.unwrap();

    assert_eq!(run.output.keys(), vec!["user_experience"]);
    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].attachments.len(), 1);
    assert!(requests[0].prompt.contains("considering: Color Scheme, Typography"));
    assert!(requests[0].prompt.contains("Additional context: Checkout page"));
}

#[test]
fn test_invalid_input_is_rejected_before_building() {
    let catalog = Catalog::default();
    let err = prepare(&catalog, TrendTopicInput { topic: String::new() }).unwrap_err();
    assert_eq!(err.code(), "INPUT");
}
