//! Promptline Stages: the pipeline catalog.
//!
//! Pipelines are data: an ordered list of stage definitions, each pairing a
//! prompt template with an agent spec. Typed inputs validate caller payloads
//! before a run is built.
//!
//! # Pipeline Flow
//!
//! ```text
//! typed input ─► validate ─► PipelineInput ─► PipelineRunner(def from Catalog)
//! ```

pub mod catalog;
pub mod inputs;
pub mod models;

pub use catalog::{
    Catalog, COMPETITOR_INTEL, COMPETITOR_TEAM, DESIGN_REVIEW, DISCOVERY_TEMPLATE,
    INSTAGRAM_ANALYSIS, STARTUP_TRENDS,
};
pub use inputs::{
    CatalogInput, CompetitorIntelInput, CompetitorTeamInput, DesignAnalysis, DesignReviewInput,
    InstagramPostsInput, TrendTopicInput,
};
pub use models::ModelDefaults;

use promptline_core::{PipelineDef, PipelineError, PipelineInput};

/// Resolve a typed input against the catalog: validated input plus the
/// definition with the input's enabled stages applied.
pub fn prepare<I: CatalogInput>(
    catalog: &Catalog,
    input: I,
) -> Result<(PipelineDef, PipelineInput), PipelineError> {
    input.validate()?;
    let def = catalog
        .get(I::PIPELINE)
        .cloned()
        .ok_or_else(|| PipelineError::Config(format!("pipeline {} not in catalog", I::PIPELINE)))?;
    let def = match input.enabled_stages() {
        Some(keys) => def.with_enabled(&keys)?,
        None => def,
    };
    tracing::debug!(pipeline = I::PIPELINE, stages = def.stages.len(), "prepared catalog input");
    Ok((def, input.into_input()?))
}
