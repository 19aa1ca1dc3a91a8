//! OpenAI-compatible chat completions provider.
//!
//! Also serves Perplexity, which speaks the same protocol at another base URL.

use async_trait::async_trait;
use promptline_core::generation::non_empty;
use promptline_core::{GenerationClient, GenerationError, GenerationRequest, ToolCapability};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::http::{data_url, send_json};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const PERPLEXITY_BASE_URL: &str = "https://api.perplexity.ai";

pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    provider: &'static str,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_string(),
            provider: "openai",
        }
    }

    /// Client preconfigured for Perplexity's `sonar` models.
    pub fn perplexity(api_key: impl Into<String>) -> Self {
        Self {
            base_url: PERPLEXITY_BASE_URL.to_string(),
            provider: "perplexity",
            ..Self::new(api_key)
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn provider(&self) -> &str {
        self.provider
    }
}

pub(crate) fn request_body(request: &GenerationRequest) -> Value {
    let mut messages = Vec::new();
    if let Some(system) = request.system_prompt() {
        messages.push(json!({ "role": "system", "content": system }));
    }

    let content = if request.attachments.is_empty() {
        json!(request.prompt)
    } else {
        let mut parts = vec![json!({ "type": "text", "text": request.prompt })];
        parts.extend(
            request
                .attachments
                .iter()
                .map(|a| json!({ "type": "image_url", "image_url": { "url": data_url(a) } })),
        );
        Value::Array(parts)
    };
    messages.push(json!({ "role": "user", "content": content }));

    let mut body = json!({
        "model": request.model_id,
        "messages": messages,
    });
    if request.tools.iter().any(ToolCapability::is_search) {
        body["web_search_options"] = json!({});
    }
    body
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl GenerationClient for OpenAiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        tracing::debug!(provider = self.provider, model = %request.model_id, "chat completion");

        let http = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body(&request));

        let response: ChatResponse = send_json(self.provider, http).await?;
        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        non_empty(text)
    }
}
