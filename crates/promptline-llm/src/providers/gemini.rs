//! Google Gemini provider.
//!
//! ```json
//! {
//!   "systemInstruction": { "parts": [{ "text": "You are ..." }] },
//!   "contents": [{ "role": "user", "parts": [{ "text": "..." }, { "inlineData": { ... } }] }],
//!   "tools": [{ "googleSearch": {} }]
//! }
//! ```

use async_trait::async_trait;
use promptline_core::generation::non_empty;
use promptline_core::{GenerationClient, GenerationError, GenerationRequest, ToolCapability};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::http::{encode_attachment, send_json};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: GEMINI_BASE_URL.to_string(),
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

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

impl GeminiRequest {
    pub(crate) fn from_request(request: &GenerationRequest) -> Self {
        let mut parts = vec![GeminiPart {
            text: Some(request.prompt.clone()),
            inline_data: None,
        }];
        parts.extend(request.attachments.iter().map(|a| GeminiPart {
            text: None,
            inline_data: Some(InlineData {
                mime_type: a.media_type.clone(),
                data: encode_attachment(a),
            }),
        }));

        let system_instruction = request.system_prompt().map(|text| GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: Some(text),
                inline_data: None,
            }],
        });

        let mut tools = Vec::new();
        if request.tools.iter().any(ToolCapability::is_search) {
            tools.push(json!({ "googleSearch": {} }));
        }
        if request.tools.contains(&ToolCapability::ArticleReader) {
            tools.push(json!({ "urlContext": {} }));
        }

        Self {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts,
            }],
            system_instruction,
            tools,
        }
    }
}

fn response_text(response: GeminiResponse) -> String {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let body = GeminiRequest::from_request(&request);
        tracing::debug!(model = %request.model_id, tools = body.tools.len(), "gemini generateContent");

        let http = self
            .client
            .post(self.endpoint(&request.model_id))
            .header("x-goog-api-key", &self.api_key)
            .json(&body);

        let response: GeminiResponse = send_json("gemini", http).await?;
        non_empty(response_text(response))
    }
}
