use std::collections::HashMap;
use std::sync::Arc;

use eztodo_common::{Error, Result};
use eztodo_config::ProvidersConfig;
use tracing::info;

use crate::providers::{DeepSeekProvider, LlmProvider, LocalProvider, OpenAiProvider};

/// Maps resolved provider names to their adapters.
///
/// Built once at startup and shared read-only between requests.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn LlmProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the OpenAI, DeepSeek and local providers.
    pub fn from_config(config: &ProvidersConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(OpenAiProvider::new(
            config.openai.base_url.clone(),
            config.openai.model.clone(),
        )));
        registry.register(Arc::new(DeepSeekProvider::new(
            config.deepseek.base_url.clone(),
            config.deepseek.model.clone(),
        )));
        registry.register(Arc::new(LocalProvider::new()));
        registry
    }

    /// Add a provider, replacing any previous one with the same id.
    pub fn register(&mut self, provider: Arc<dyn LlmProvider>) {
        let id = provider.provider_id().to_string();
        info!("registered LLM provider: {}", id);
        self.providers.insert(id, provider);
    }

    pub fn get(&self, id: &str) -> Result<Arc<dyn LlmProvider>> {
        self.providers
            .get(id)
            .cloned()
            .ok_or_else(|| Error::UnknownProvider(id.to_string()))
    }

    /// Registered provider ids, sorted.
    pub fn provider_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.providers.keys().cloned().collect();
        ids.sort();
        ids
    }
}
