//! Agent specification: the static configuration of one stage.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Server-side tools a provider may run on the agent's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCapability {
    WebSearch,
    NewsSearch,
    ArticleReader,
}

impl ToolCapability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebSearch => "web_search",
            Self::NewsSearch => "news_search",
            Self::ArticleReader => "article_reader",
        }
    }

    /// Whether the capability is served by a provider's search grounding.
    pub fn is_search(&self) -> bool {
        matches!(self, Self::WebSearch | Self::NewsSearch)
    }
}

/// What an agent can consume besides plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "tools", rename_all = "snake_case")]
pub enum AgentKind {
    /// Prompt in, text out.
    Text,
    /// Accepts image attachments alongside the prompt.
    Vision,
    /// May use the listed provider-side tools.
    ToolAugmented(BTreeSet<ToolCapability>),
}

impl AgentKind {
    pub fn tools<I: IntoIterator<Item = ToolCapability>>(tools: I) -> Self {
        Self::ToolAugmented(tools.into_iter().collect())
    }

    pub fn accepts_attachments(&self) -> bool {
        matches!(self, Self::Vision)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub role: String,
    pub instructions: Vec<String>,
    pub model_id: String,
    pub kind: AgentKind,
}

impl AgentSpec {
    pub fn new(role: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            instructions: Vec::new(),
            model_id: model_id.into(),
            kind: AgentKind::Text,
        }
    }

    pub fn instruction(mut self, line: impl Into<String>) -> Self {
        self.instructions.push(line.into());
        self
    }

    pub fn instructions<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instructions.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn kind(mut self, kind: AgentKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn tool_capabilities(&self) -> BTreeSet<ToolCapability> {
        match &self.kind {
            AgentKind::ToolAugmented(tools) => tools.clone(),
            _ => BTreeSet::new(),
        }
    }
}
