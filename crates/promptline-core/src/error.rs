//! Unified Error Model
use thiserror::Error;

use crate::generation::GenerationError;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Bad credentials, unknown templates or unroutable models. Raised before
    /// any stage runs.
    #[error("CONFIG/{0}")]
    Config(String),

    /// Missing or malformed caller input. Raised before any network call.
    #[error("INPUT/{0}")]
    InvalidInput(String),

    #[error("RENDER/{stage}: {message}")]
    Render { stage: String, message: String },

    /// A stage's generation call failed and the run was aborted.
    #[error("GENERATION/{stage}: generation failed")]
    Generation {
        stage: String,
        #[source]
        source: GenerationError,
    },
}

impl PipelineError {
    /// Stage key the error is attached to, when there is one.
    pub fn stage(&self) -> Option<&str> {
        match self {
            Self::Render { stage, .. } | Self::Generation { stage, .. } => Some(stage),
            _ => None,
        }
    }

    /// Short machine-readable code, the prefix of the display form.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::InvalidInput(_) => "INPUT",
            Self::Render { .. } => "RENDER",
            Self::Generation { .. } => "GENERATION",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error_hides_detail() {
        let err = PipelineError::Generation {
            stage: "engagement".to_string(),
            source: GenerationError::Timeout,
        };
        assert_eq!(err.to_string(), "GENERATION/engagement: generation failed");
        assert_eq!(err.stage(), Some("engagement"));
        assert_eq!(err.code(), "GENERATION");
    }

    #[test]
    fn test_config_error_has_no_stage() {
        let err = PipelineError::Config("missing key".to_string());
        assert_eq!(err.stage(), None);
        assert_eq!(err.to_string(), "CONFIG/missing key");
    }
}
