use std::sync::Arc;

use eztodo_agents::ProviderRegistry;
use eztodo_config::{AppConfig, ConfigSources, ResolvedConfig};

/// Read-only state shared by every request handler.
pub struct AppState {
    pub config: AppConfig,
    pub sources: ConfigSources,
    pub providers: ProviderRegistry,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: AppConfig, sources: ConfigSources) -> Self {
        let providers = ProviderRegistry::from_config(&config.providers);
        Self::with_providers(config, sources, providers)
    }

    pub fn with_providers(
        config: AppConfig,
        sources: ConfigSources,
        providers: ProviderRegistry,
    ) -> Self {
        Self {
            config,
            sources,
            providers,
        }
    }

    /// Fresh provider/credential resolution against the configured sources.
    pub fn resolve(&self) -> ResolvedConfig {
        eztodo_config::resolve(&self.sources)
    }
}
