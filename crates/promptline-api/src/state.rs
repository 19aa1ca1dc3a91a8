//! Shared handler state, assembled once from [`Settings`].
use promptline_core::GenerationClient;
use promptline_llm::ModelRouter;
use promptline_out::TemplateRenderer;
use promptline_sources::{FirecrawlClient, WebhookClient};
use promptline_stages::Catalog;
use std::sync::Arc;

use crate::config::Settings;
use crate::error::StartupError;
use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub catalog: Arc<Catalog>,
    pub client: Arc<dyn GenerationClient>,
    pub renderer: Arc<TemplateRenderer>,
    pub webhook: Option<Arc<WebhookClient>>,
    pub firecrawl: Option<Arc<FirecrawlClient>>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// State around an explicit generation client. Source clients are left
    /// unset; see [`AppState::from_settings`] for the configured service.
    pub fn new(
        settings: Settings,
        client: Arc<dyn GenerationClient>,
        renderer: TemplateRenderer,
    ) -> Result<Self, StartupError> {
        let catalog = Catalog::new(&settings.models).with_max_input_chars(settings.max_input_chars);
        Ok(Self {
            settings: Arc::new(settings),
            catalog: Arc::new(catalog),
            client,
            renderer: Arc::new(renderer),
            webhook: None,
            firecrawl: None,
            metrics: Arc::new(Metrics::new()?),
        })
    }

    pub fn from_settings(settings: Settings) -> Result<Self, StartupError> {
        let router = ModelRouter::from_keys(&settings.providers, settings.generation_timeout())?;
        let renderer = TemplateRenderer::with_overrides(settings.templates_path.as_deref())?;
        let webhook = settings.webhook_url.clone().map(WebhookClient::new);
        let firecrawl = settings.firecrawl_api_key.clone().map(FirecrawlClient::new);

        match &webhook {
            Some(client) => tracing::info!(url = client.url(), "webhook configured"),
            None => tracing::warn!("PROMPTLINE_WEBHOOK_URL not set; Instagram reports and webhook routes disabled"),
        }
        if firecrawl.is_none() {
            tracing::warn!("FIRECRAWL_API_KEY not set; competitor discovery disabled");
        }

        let mut state = Self::new(settings, Arc::new(router), renderer)?;
        state.webhook = webhook.map(Arc::new);
        state.firecrawl = firecrawl.map(Arc::new);
        Ok(state)
    }

    pub fn with_webhook(mut self, client: WebhookClient) -> Self {
        self.webhook = Some(Arc::new(client));
        self
    }

    pub fn with_firecrawl(mut self, client: FirecrawlClient) -> Self {
        self.firecrawl = Some(Arc::new(client));
        self
    }
}
