use promptline_core::GenerationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("VALIDATION/{0}")]
    Validation(String),

    #[error("TRANSPORT/{0}")]
    Transport(String),

    #[error("TIMEOUT/{0}")]
    Timeout(String),

    #[error("STATUS/{status}: {body}")]
    Status { status: u16, body: String },

    #[error("MALFORMED/{0}")]
    Malformed(String),

    #[error("EXTRACTION/{0}")]
    Extraction(String),

    #[error("GENERATION/{0}")]
    Generation(#[from] GenerationError),
}

impl SourceError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub(crate) fn from_reqwest(what: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(what.to_string())
        } else {
            Self::Transport(format!("{}: {}", what, error))
        }
    }
}
