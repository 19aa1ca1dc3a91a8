//! Competitor website extraction through Firecrawl's extract API.
//!
//! `POST /v1/extract` starts a job over `{url}/*`; the job is polled with
//! `GET /v1/extract/{id}` at a fixed interval until it leaves the pending
//! states or the attempt budget runs out.
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use crate::error::SourceError;

pub const FIRECRAWL_BASE_URL: &str = "https://api.firecrawl.dev";
const MAX_LIST_ITEMS: usize = 5;
const NOT_AVAILABLE: &str = "N/A";

pub const EXTRACTION_PROMPT: &str = "Extract detailed information about the company's offerings, including:
- Company name and basic information
- Pricing details, plans, and tiers
- Key features and main capabilities
- Technology stack and technical details
- Marketing focus and target audience
- Customer feedback and testimonials

Analyze the entire website content to provide comprehensive information for each field.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitorProfile {
    pub competitor_url: String,
    pub company_name: String,
    pub pricing: String,
    pub key_features: Vec<String>,
    pub tech_stack: Vec<String>,
    pub marketing_focus: String,
    pub customer_feedback: String,
}

impl CompetitorProfile {
    /// Build from extracted data, with `"N/A"` for missing text fields and
    /// at most five list items.
    pub fn from_extracted(competitor_url: &str, data: &Value) -> Self {
        let text = |key: &str| match data.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(Value::Null) | None => NOT_AVAILABLE.to_string(),
            Some(Value::String(_)) => NOT_AVAILABLE.to_string(),
            Some(other) => other.to_string(),
        };
        let list = |key: &str| -> Vec<String> {
            data.get(key)
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|v| match v {
                            Value::String(s) => Some(s.trim().to_string()),
                            Value::Null => None,
                            other => Some(other.to_string()),
                        })
                        .filter(|s| !s.is_empty())
                        .take(MAX_LIST_ITEMS)
                        .collect()
                })
                .unwrap_or_default()
        };

        Self {
            competitor_url: competitor_url.to_string(),
            company_name: text("company_name"),
            pricing: text("pricing"),
            key_features: list("key_features"),
            tech_stack: list("tech_stack"),
            marketing_focus: text("marketing_focus"),
            customer_feedback: text("customer_feedback"),
        }
    }
}

/// JSON schema sent with every extraction job.
pub fn extraction_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "company_name": { "type": "string", "description": "Name of the company" },
            "pricing": { "type": "string", "description": "Pricing details, tiers, and plans" },
            "key_features": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Main features and capabilities of the product/service"
            },
            "tech_stack": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Technologies, frameworks, and tools used"
            },
            "marketing_focus": { "type": "string", "description": "Main marketing angles and target audience" },
            "customer_feedback": { "type": "string", "description": "Customer testimonials, reviews, and feedback" }
        },
        "required": ["company_name", "pricing", "key_features", "tech_stack", "marketing_focus", "customer_feedback"]
    })
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl ExtractResponse {
    fn is_pending(&self) -> bool {
        matches!(self.status.as_deref(), Some("processing") | Some("pending") | Some("queued"))
    }

    /// Extracted data, when the job finished with a non-empty object.
    fn finished_data(self) -> Option<Value> {
        if !self.success || self.is_pending() {
            return None;
        }
        self.data.filter(|d| d.as_object().is_some_and(|o| !o.is_empty()))
    }
}

pub struct FirecrawlClient {
    client: Client,
    api_key: String,
    base_url: String,
    poll_interval: Duration,
    max_polls: u32,
}

impl FirecrawlClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: FIRECRAWL_BASE_URL.to_string(),
            poll_interval: Duration::from_secs(2),
            max_polls: 60,
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

    pub fn with_polling(mut self, interval: Duration, max_polls: u32) -> Self {
        self.poll_interval = interval;
        self.max_polls = max_polls;
        self
    }

    /// Extract one competitor's profile from its site.
    pub async fn extract(&self, competitor_url: &str) -> Result<CompetitorProfile, SourceError> {
        let site = competitor_url.trim().trim_end_matches('/');
        if site.is_empty() {
            return Err(SourceError::Validation("competitor url is required".to_string()));
        }

        let body = json!({
            "urls": [format!("{}/*", site)],
            "prompt": EXTRACTION_PROMPT,
            "schema": extraction_schema(),
        });
        let started: ExtractResponse = self
            .send(self.client.post(format!("{}/v1/extract", self.base_url)).json(&body))
            .await?;

        if !started.success {
            return Err(SourceError::Extraction(
                started.error.unwrap_or_else(|| format!("extraction of {} was rejected", site)),
            ));
        }

        let mut current = started;
        let mut polls = 0;
        while current.is_pending() || (current.status.is_none() && current.data.is_none()) {
            let id = current
                .id
                .clone()
                .ok_or_else(|| SourceError::Malformed("pending extraction without id".to_string()))?;
            if polls >= self.max_polls {
                return Err(SourceError::Timeout(format!("extraction of {} still pending", site)));
            }
            polls += 1;
            tokio::time::sleep(self.poll_interval).await;

            let mut next: ExtractResponse = self
                .send(self.client.get(format!("{}/v1/extract/{}", self.base_url, id)))
                .await?;
            if !next.success {
                return Err(SourceError::Extraction(
                    next.error
                        .unwrap_or_else(|| format!("extraction of {} failed while polling", site)),
                ));
            }
            next.id.get_or_insert(id);
            current = next;
        }

        if let Some(status) = current.status.as_deref().filter(|s| *s == "failed" || *s == "cancelled") {
            return Err(SourceError::Extraction(format!("extraction of {} {}", site, status)));
        }

        let data = current
            .finished_data()
            .ok_or_else(|| SourceError::Extraction(format!("no data extracted from {}", site)))?;
        tracing::debug!(url = %site, polls, "competitor extracted");
        Ok(CompetitorProfile::from_extracted(site, &data))
    }

    /// Extract every competitor; failures skip that competitor. Extracting
    /// none is an error.
    pub async fn extract_all(&self, urls: &[String]) -> Result<Vec<CompetitorProfile>, SourceError> {
        let mut profiles = Vec::with_capacity(urls.len());
        for url in urls {
            match self.extract(url).await {
                Ok(profile) => profiles.push(profile),
                Err(e) => tracing::warn!(url = %url, error = %e, "skipping competitor"),
            }
        }
        if profiles.is_empty() {
            return Err(SourceError::Extraction(
                "could not extract data from any competitor URL".to_string(),
            ));
        }
        Ok(profiles)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<ExtractResponse, SourceError> {
        let response = request
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest("firecrawl", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json()
            .await
            .map_err(|e| SourceError::Malformed(format!("firecrawl: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_defaults_and_caps() {
        let data = json!({
            "company_name": "Rival",
            "pricing": "",
            "key_features": ["a", "b", "c", "d", "e", "f", "g"],
            "tech_stack": ["Rust", null, "Postgres"]
        });
        let profile = CompetitorProfile::from_extracted("https://rival.io", &data);
        assert_eq!(profile.company_name, "Rival");
        assert_eq!(profile.pricing, "N/A");
        assert_eq!(profile.key_features.len(), 5);
        assert_eq!(profile.tech_stack, vec!["Rust", "Postgres"]);
        assert_eq!(profile.marketing_focus, "N/A");
        assert_eq!(profile.customer_feedback, "N/A");
    }

    #[test]
    fn test_schema_lists_every_profile_field() {
        let schema = extraction_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 6);
        assert!(schema["properties"]["tech_stack"]["items"].is_object());
    }
}
