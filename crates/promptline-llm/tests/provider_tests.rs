use promptline_core::{
    AgentKind, AgentSpec, Attachment, GenerationClient, GenerationError, GenerationRequest,
    ToolCapability,
};
use promptline_llm::{build_http_client, AnthropicClient, GeminiClient, ModelRouter, OpenAiClient};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gemini_reply(text: &str) -> serde_json::Value {
    json!({ "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }] })
}

#[tokio::test]
async fn test_gemini_sends_key_header_and_returns_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash-exp:generateContent"))
        .and(header("x-goog-api-key", "g-key"))
        .and(body_partial_json(json!({
            "systemInstruction": { "parts": [{ "text": "Analyze content" }] },
            "tools": [{ "googleSearch": {} }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("Content report")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new("g-key").with_base_url(server.uri());
    let spec = AgentSpec::new("Content Analyst", "gemini-2.0-flash-exp")
        .instruction("Analyze content")
        .kind(AgentKind::tools([ToolCapability::WebSearch]));
    let text = client
        .generate(GenerationRequest::for_agent(&spec, "posts".to_string(), &[]))
        .await
        .unwrap();

    assert_eq!(text, "Content report");
}

#[tokio::test]
async fn test_gemini_blank_text_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("  \n")))
        .mount(&server)
        .await;

    let client = GeminiClient::new("g-key").with_base_url(server.uri());
    let err = client
        .generate(GenerationRequest::new("gemini-2.0-flash-exp", "hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::EmptyResponse));
}

#[tokio::test]
async fn test_rejected_credential_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let client = OpenAiClient::new("bad").with_base_url(server.uri());
    let err = client
        .generate(GenerationRequest::new("gpt-4o", "hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Auth(msg) if msg.contains("invalid api key")));
}

#[tokio::test]
async fn test_server_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let client = AnthropicClient::new("a-key").with_base_url(server.uri());
    let err = client
        .generate(GenerationRequest::new("claude-3-5-sonnet-20240620", "hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Api { status: 503, ref body } if body == "overloaded"));
}

#[tokio::test]
async fn test_malformed_body_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let client = OpenAiClient::new("k").with_base_url(server.uri());
    let err = client
        .generate(GenerationRequest::new("gpt-4o", "hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Malformed(_)));
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_reply("late"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let http = build_http_client(Duration::from_millis(200)).unwrap();
    let client = GeminiClient::new("g-key")
        .with_base_url(server.uri())
        .with_http_client(http);
    let err = client
        .generate(GenerationRequest::new("gemini-2.0-flash-exp", "hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Timeout));
}

#[tokio::test]
async fn test_anthropic_headers_and_text_blocks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("x-api-key", "a-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                { "type": "server_tool_use", "id": "t1", "name": "web_search" },
                { "type": "text", "text": "Part one. " },
                { "type": "text", "text": "Part two." }
            ]
        })))
        .mount(&server)
        .await;

    let client = AnthropicClient::new("a-key").with_base_url(server.uri());
    let text = client
        .generate(GenerationRequest::new("claude-3-5-sonnet-20240620", "hi"))
        .await
        .unwrap();
    assert_eq!(text, "Part one. Part two.");
}

#[tokio::test]
async fn test_router_dispatches_by_prefix() {
    let gemini = MockServer::start().await;
    let perplexity = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("from gemini")))
        .mount(&gemini)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "model": "sonar-pro" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "https://rival.io" } }]
        })))
        .mount(&perplexity)
        .await;

    let router = ModelRouter::new()
        .with_gemini(GeminiClient::new("g").with_base_url(gemini.uri()))
        .with_perplexity(OpenAiClient::perplexity("p").with_base_url(perplexity.uri()));

    let a = router
        .generate(GenerationRequest::new("gemini-2.0-flash-exp", "hi"))
        .await
        .unwrap();
    let b = router
        .generate(GenerationRequest::new("sonar-pro", "competitors?"))
        .await
        .unwrap();
    assert_eq!(a, "from gemini");
    assert_eq!(b, "https://rival.io");
    assert!(!router.supports("gpt-4o"));
}

#[tokio::test]
async fn test_vision_request_carries_images() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": "review" },
                    { "type": "image_url", "image_url": { "url": "data:image/png;base64,AQID" } }
                ]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "Looks clean." } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new("k").with_base_url(server.uri());
    let spec = AgentSpec::new("UX Reviewer", "gpt-4o").kind(AgentKind::Vision);
    let image = Attachment::new("image/png", vec![1, 2, 3]);
    let text = client
        .generate(GenerationRequest::for_agent(&spec, "review".to_string(), &[image]))
        .await
        .unwrap();
    assert_eq!(text, "Looks clean.");
}
