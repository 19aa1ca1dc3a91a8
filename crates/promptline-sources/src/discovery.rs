//! Competitor URL discovery through a search-grounded model.
use promptline_core::{GenerationClient, GenerationRequest, PromptRenderer};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::error::SourceError;

pub const DISCOVERY_INSTRUCTION: &str = "Be precise and only return 3 company URLs ONLY.";
const DEFAULT_MAX_URLS: usize = 3;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveryQuery {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl DiscoveryQuery {
    fn cleaned(&self) -> Result<(String, String), SourceError> {
        let url = self.url.as_deref().unwrap_or("").trim().to_string();
        let description = self.description.as_deref().unwrap_or("").trim().to_string();
        if url.is_empty() && description.is_empty() {
            return Err(SourceError::Validation(
                "provide either a URL or a description".to_string(),
            ));
        }
        Ok((url, description))
    }
}

pub struct CompetitorFinder {
    client: Arc<dyn GenerationClient>,
    renderer: Arc<dyn PromptRenderer>,
    template_id: String,
    model_id: String,
    max_urls: usize,
}

impl CompetitorFinder {
    pub fn new(
        client: Arc<dyn GenerationClient>,
        renderer: Arc<dyn PromptRenderer>,
        template_id: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            renderer,
            template_id: template_id.into(),
            model_id: model_id.into(),
            max_urls: DEFAULT_MAX_URLS,
        }
    }

    pub async fn find(&self, query: &DiscoveryQuery) -> Result<Vec<String>, SourceError> {
        let (url, description) = query.cleaned()?;
        let prompt = self
            .renderer
            .render(&self.template_id, &json!({ "url": url, "description": description }))
            .map_err(|e| SourceError::Validation(e.to_string()))?;

        let mut request = GenerationRequest::new(&self.model_id, prompt);
        request.instructions.push(DISCOVERY_INSTRUCTION.to_string());

        let text = self.client.generate(request).await?;
        let urls: Vec<String> = parse_urls(&text).into_iter().take(self.max_urls).collect();
        tracing::info!(found = urls.len(), model = %self.model_id, "competitor discovery finished");
        Ok(urls)
    }
}

/// Keep the lines of a model reply that look like URLs, without list
/// markers or Markdown decoration. Duplicates are dropped.
pub fn parse_urls(text: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for line in text.lines() {
        let cleaned = strip_list_marker(line.trim())
            .trim_matches(|c: char| matches!(c, '<' | '>' | '*' | '`' | '[' | ']' | '(' | ')' | ','));
        let candidate = cleaned.trim_end_matches('.');
        if looks_like_url(candidate) && !urls.iter().any(|u| u == candidate) {
            urls.push(candidate.to_string());
        }
    }
    urls
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim_start_matches(['-', '*', '•']).trim_start();
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return rest.trim_start();
        }
    }
    line
}

fn looks_like_url(candidate: &str) -> bool {
    if candidate.is_empty() || candidate.contains(char::is_whitespace) {
        return false;
    }
    let host = candidate
        .strip_prefix("https://")
        .or_else(|| candidate.strip_prefix("http://"))
        .unwrap_or(candidate);
    let host = host.split('/').next().unwrap_or("");
    host.contains('.') && !host.starts_with('.') && !host.ends_with('.')
}
