//! Promptline API /v1: REST endpoints over the pipeline catalog
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET /v1/health` | liveness and version |
//! | `GET /v1/pipelines` | catalog with stage lists |
//! | `POST /v1/pipelines/{name}/run` | run one pipeline |
//! | `POST /v1/reports/csv` | records to CSV |
//! | `POST /v1/instagram/report` | fetch (and optionally analyze) a profile report |
//! | `POST /v1/competitors/discover` | discover, extract and optionally compare competitors |
//! | `POST /v1/webhook/document` | forward a document trigger |
//! | `POST /v1/webhook/access` | forward an access request |
//! | `GET /metrics` | Prometheus text format |
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod runs;
pub mod state;

pub use config::{ConfigError, Settings};
pub use error::{ApiError, StartupError};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Design screenshots arrive base64-encoded inside JSON.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handlers::health))
        .route("/v1/pipelines", get(handlers::list_pipelines))
        .route("/v1/pipelines/{name}/run", post(handlers::run_pipeline))
        .route("/v1/reports/csv", post(handlers::reports_csv))
        .route("/v1/instagram/report", post(handlers::instagram_report))
        .route("/v1/competitors/discover", post(handlers::competitors_discover))
        .route("/v1/webhook/document", post(handlers::webhook_document))
        .route("/v1/webhook/access", post(handlers::webhook_access))
        .route("/metrics", get(handlers::metrics))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(middleware::request_timing))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors())
        .with_state(state)
}

pub async fn run(addr: &str, state: AppState) -> Result<(), StartupError> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Promptline API listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
