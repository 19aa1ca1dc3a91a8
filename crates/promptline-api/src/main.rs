//! Binary entrypoint for the Promptline API server.
use promptline_api::{run, AppState, Settings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            std::process::exit(1);
        }
    };
    let addr = settings.addr.clone();

    let state = match AppState::from_settings(settings) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "failed to initialise service");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&addr, state).await {
        tracing::error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}
