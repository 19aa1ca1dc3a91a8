//! Anthropic Messages API provider.
use async_trait::async_trait;
use promptline_core::generation::non_empty;
use promptline_core::{GenerationClient, GenerationError, GenerationRequest};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::http::{encode_attachment, send_json};

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;
const WEB_SEARCH_MAX_USES: u32 = 5;

pub struct AnthropicClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: ANTHROPIC_BASE_URL.to_string(),
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
}

pub(crate) fn request_body(request: &GenerationRequest) -> Value {
    // Images go before the text block.
    let mut content: Vec<Value> = request
        .attachments
        .iter()
        .map(|a| {
            json!({
                "type": "image",
                "source": {
                    "type": "base64",
                    "media_type": a.media_type,
                    "data": encode_attachment(a),
                }
            })
        })
        .collect();
    content.push(json!({ "type": "text", "text": request.prompt }));

    let mut body = json!({
        "model": request.model_id,
        "max_tokens": MAX_TOKENS,
        "messages": [{ "role": "user", "content": content }],
    });
    if let Some(system) = request.system_prompt() {
        body["system"] = json!(system);
    }
    if !request.tools.is_empty() {
        body["tools"] = json!([{
            "type": "web_search_20250305",
            "name": "web_search",
            "max_uses": WEB_SEARCH_MAX_USES,
        }]);
    }
    body
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl GenerationClient for AnthropicClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        tracing::debug!(model = %request.model_id, "anthropic messages");

        let http = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request_body(&request));

        let response: MessagesResponse = send_json("anthropic", http).await?;
        let text: String = response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();
        non_empty(text)
    }
}
