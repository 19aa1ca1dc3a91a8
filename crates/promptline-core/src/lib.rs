//! Promptline Core: Stage Runner, Orchestrator and Data Model
//!
//! A pipeline is an ordered list of stages. Each stage renders a prompt
//! template, makes exactly one generation call and stores the returned text
//! under its stage key. Stages never run in parallel: a stage may interpolate
//! the text of the stage right before it.
//!
//! ```text
//! PipelineInput ─► render ─► [stage 1] ─► render(+previous) ─► [stage 2] ─► …
//!                                │                                │
//!                           StageResult                      StageResult
//!                                └──────────► PipelineOutput ◄────┘
//! ```

pub mod agent;
pub mod context;
pub mod data_model;
pub mod error;
pub mod generation;
pub mod payload;
pub mod render;
pub mod runner;
pub mod stage;

pub use agent::{AgentKind, AgentSpec, ToolCapability};
pub use context::{CollectingProgress, NoProgress, ProgressEvent, ProgressSink, RunContext};
pub use data_model::{
    Attachment, PipelineDef, PipelineInput, PipelineOutput, PipelineRun, StageDef, StageRecord,
    StageResult,
};
pub use error::PipelineError;
pub use generation::{GenerationClient, GenerationError, GenerationRequest};
pub use payload::bounded_json;
pub use render::{PromptRenderer, RenderError};
pub use runner::PipelineRunner;
pub use stage::StageRunner;

/// Default cap on the serialised pipeline input placed into a prompt.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 32_000;
