use serde::{Deserialize, Serialize};

/// Top-level application configuration, usually read from `config.yml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// Reported in failure diagnostics, e.g. "development" or "production".
    pub environment: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            environment: "development".to_string(),
        }
    }
}

/// Endpoint overrides for the networked providers. Unset fields fall back to
/// each provider's public endpoint and default model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub openai: EndpointConfig,
    pub deepseek: EndpointConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
}
