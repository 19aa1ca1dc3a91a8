//! HTTP error mapping. Bodies are `{ "error": ..., "code": ... }`.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use promptline_core::{GenerationError, PipelineError};
use promptline_out::OutputError;
use promptline_sources::SourceError;
use serde_json::json;
use thiserror::Error;

const GENERATION_FAILED: &str = "generation failed; the run was aborted";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("unknown pipeline {0}")]
    UnknownPipeline(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0} is not configured")]
    NotConfigured(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Pipeline(e) => match e {
                PipelineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                PipelineError::Config(_) | PipelineError::Render { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                PipelineError::Generation { .. } => StatusCode::BAD_GATEWAY,
            },
            Self::Source(SourceError::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::Source(SourceError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            Self::Source(_) => StatusCode::BAD_GATEWAY,
            Self::Output(OutputError::Render(_)) => StatusCode::BAD_REQUEST,
            Self::Output(OutputError::Template(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UnknownPipeline(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Pipeline(e) => e.code(),
            Self::Source(SourceError::Validation(_)) => "INPUT",
            Self::Source(_) => "UPSTREAM",
            Self::Output(_) => "OUTPUT",
            Self::UnknownPipeline(_) => "NOT_FOUND",
            Self::BadRequest(_) => "INPUT",
            Self::NotConfigured(_) => "NOT_CONFIGURED",
        }
    }

    /// Generation failures share one message; provider detail stays in logs.
    fn public_message(&self) -> String {
        match self {
            Self::Pipeline(PipelineError::Generation { .. })
            | Self::Source(SourceError::Generation(_)) => GENERATION_FAILED.to_string(),
            other => other.to_string(),
        }
    }
}

/// Failures while assembling the service, before it listens.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error("TEMPLATES/{0}")]
    Templates(#[from] OutputError),

    #[error("HTTP_CLIENT/{0}")]
    HttpClient(#[from] GenerationError),

    #[error("METRICS/{0}")]
    Metrics(#[from] prometheus::Error),

    #[error("IO/{0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }
        let body = Json(json!({
            "error": self.public_message(),
            "code": self.code(),
        }));
        (status, body).into_response()
    }
}
