pub mod loader;
pub mod model;
pub mod sources;

pub use loader::ConfigLoader;
pub use model::{AppConfig, EndpointConfig, GatewayConfig, ProvidersConfig};
pub use sources::{
    ConfigSources, DEEPSEEK, DEFAULT_PROVIDER, Exposure, LOCAL, NamedSource, OPENAI,
    ResolvedConfig, Setting, resolve,
};
