//! Typed inputs for the catalog pipelines.
//!
//! Each input validates its required fields before anything is built and
//! converts into the generic [`PipelineInput`].
use promptline_core::{Attachment, PipelineError, PipelineInput};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::catalog::{COMPETITOR_INTEL, COMPETITOR_TEAM, DESIGN_REVIEW, INSTAGRAM_ANALYSIS, STARTUP_TRENDS};

pub trait CatalogInput {
    /// Catalog name of the pipeline this input feeds.
    const PIPELINE: &'static str;

    fn validate(&self) -> Result<(), PipelineError>;

    /// Stage keys to run; `None` runs the whole pipeline.
    fn enabled_stages(&self) -> Option<Vec<String>> {
        None
    }

    fn into_input(self) -> Result<PipelineInput, PipelineError>;
}

fn invalid(message: impl Into<String>) -> PipelineError {
    PipelineError::InvalidInput(message.into())
}

/// Post records of one account. An empty list is allowed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstagramPostsInput {
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub posts: Vec<Value>,
}

impl CatalogInput for InstagramPostsInput {
    const PIPELINE: &'static str = INSTAGRAM_ANALYSIS;

    fn validate(&self) -> Result<(), PipelineError> {
        match self.posts.iter().position(|p| !p.is_object()) {
            Some(i) => Err(invalid(format!("post {} is not an object", i))),
            None => Ok(()),
        }
    }

    fn into_input(self) -> Result<PipelineInput, PipelineError> {
        self.validate()?;
        Ok(PipelineInput::new(Value::Array(self.posts)))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompetitorTeamInput {
    /// Free-form company description (text or object)
    #[serde(default)]
    pub company: Value,
    #[serde(default)]
    pub competitors: Vec<String>,
}

impl CatalogInput for CompetitorTeamInput {
    const PIPELINE: &'static str = COMPETITOR_TEAM;

    fn validate(&self) -> Result<(), PipelineError> {
        let missing = match &self.company {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            Value::Object(map) => map.is_empty(),
            _ => false,
        };
        if missing {
            return Err(invalid("company is required"));
        }
        Ok(())
    }

    fn into_input(self) -> Result<PipelineInput, PipelineError> {
        self.validate()?;
        let competitors: Vec<String> = self
            .competitors
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        Ok(PipelineInput::new(json!({
            "company": self.company,
            "competitors": competitors,
        })))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrendTopicInput {
    pub topic: String,
}

impl CatalogInput for TrendTopicInput {
    const PIPELINE: &'static str = STARTUP_TRENDS;

    fn validate(&self) -> Result<(), PipelineError> {
        if self.topic.trim().is_empty() {
            return Err(invalid("topic must not be empty"));
        }
        Ok(())
    }

    fn into_input(self) -> Result<PipelineInput, PipelineError> {
        self.validate()?;
        Ok(PipelineInput::new(Value::String(self.topic.trim().to_string())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignAnalysis {
    Visual,
    Ux,
    Market,
}

impl DesignAnalysis {
    pub fn stage_key(&self) -> &'static str {
        match self {
            Self::Visual => "visual_design",
            Self::Ux => "user_experience",
            Self::Market => "market_analysis",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![Self::Visual, Self::Ux, Self::Market]
    }
}

/// Screenshots to review. Competitor designs are only counted in the
/// prompt; their images ride along with the user's designs.
#[derive(Debug, Clone)]
pub struct DesignReviewInput {
    pub focus_elements: Vec<String>,
    pub context: String,
    pub designs: Vec<Attachment>,
    pub competitor_designs: Vec<Attachment>,
    pub analyses: Vec<DesignAnalysis>,
}

impl DesignReviewInput {
    pub fn new(designs: Vec<Attachment>) -> Self {
        Self {
            focus_elements: Vec::new(),
            context: String::new(),
            designs,
            competitor_designs: Vec::new(),
            analyses: DesignAnalysis::all(),
        }
    }
}

impl CatalogInput for DesignReviewInput {
    const PIPELINE: &'static str = DESIGN_REVIEW;

    fn validate(&self) -> Result<(), PipelineError> {
        if self.designs.is_empty() {
            return Err(invalid("at least one design image is required"));
        }
        if self.analyses.is_empty() {
            return Err(invalid("select at least one analysis"));
        }
        let non_image = self
            .designs
            .iter()
            .chain(&self.competitor_designs)
            .find(|a| !a.media_type.starts_with("image/"));
        if let Some(attachment) = non_image {
            return Err(invalid(format!("unsupported attachment type {}", attachment.media_type)));
        }
        Ok(())
    }

    fn enabled_stages(&self) -> Option<Vec<String>> {
        Some(self.analyses.iter().map(|a| a.stage_key().to_string()).collect())
    }

    fn into_input(self) -> Result<PipelineInput, PipelineError> {
        self.validate()?;
        let data = json!({
            "focus_elements": self.focus_elements,
            "context": self.context,
            "design_count": self.designs.len(),
            "competitor_designs": self.competitor_designs.len(),
        });
        let mut attachments = self.designs;
        attachments.extend(self.competitor_designs);
        Ok(PipelineInput::new(data).with_attachments(attachments))
    }
}

/// Extracted competitor profiles, as JSON objects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompetitorIntelInput {
    pub competitors: Vec<Value>,
}

impl CatalogInput for CompetitorIntelInput {
    const PIPELINE: &'static str = COMPETITOR_INTEL;

    fn validate(&self) -> Result<(), PipelineError> {
        if self.competitors.is_empty() {
            return Err(invalid("at least one competitor profile is required"));
        }
        Ok(())
    }

    fn into_input(self) -> Result<PipelineInput, PipelineError> {
        self.validate()?;
        Ok(PipelineInput::new(Value::Array(self.competitors)))
    }
}
