//! Provider and credential resolution from named configuration sources.
//!
//! Each logical setting is backed by an ordered list of named sources. A
//! publicly-exposed source always wins over a build-time-only one; the first
//! source holding a non-blank value is used.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

/// Provider used when no provider name is configured anywhere.
pub const DEFAULT_PROVIDER: &str = "deepseek";

pub const OPENAI: &str = "openai";
pub const DEEPSEEK: &str = "deepseek";
pub const LOCAL: &str = "local";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exposure {
    Public,
    BuildTime,
}

/// A single named configuration value (an environment variable).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedSource {
    pub name: &'static str,
    pub exposure: Exposure,
}

/// The logical settings the gateway resolves per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    Provider,
    OpenAiKey,
    DeepSeekKey,
}

impl Setting {
    pub const ALL: [Setting; 3] = [Setting::Provider, Setting::OpenAiKey, Setting::DeepSeekKey];

    /// Sources for this setting, highest precedence first.
    pub fn sources(self) -> [NamedSource; 2] {
        let (public, build_time) = match self {
            Setting::Provider => ("EZTODO_PUBLIC_AI_SERVICE", "AI_SERVICE"),
            Setting::OpenAiKey => ("EZTODO_PUBLIC_OPENAI_API_KEY", "OPENAI_API_KEY"),
            Setting::DeepSeekKey => ("EZTODO_PUBLIC_DEEPSEEK_API_KEY", "DEEPSEEK_API_KEY"),
        };
        [
            NamedSource {
                name: public,
                exposure: Exposure::Public,
            },
            NamedSource {
                name: build_time,
                exposure: Exposure::BuildTime,
            },
        ]
    }

    /// Credential setting for a provider family, if that provider needs one.
    pub fn credential_for(provider: &str) -> Option<Setting> {
        match provider {
            OPENAI => Some(Setting::OpenAiKey),
            DEEPSEEK => Some(Setting::DeepSeekKey),
            _ => None,
        }
    }
}

/// Immutable snapshot of the named configuration values.
///
/// Blank values are dropped on insertion so that they behave exactly like
/// unset ones.
#[derive(Clone, Default)]
pub struct ConfigSources {
    values: HashMap<&'static str, String>,
}

impl ConfigSources {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture every known source from the process environment.
    pub fn from_env() -> Self {
        Self::collect(|name| std::env::var(name).ok())
    }

    /// Build from explicit `(name, value)` pairs. Unknown names are ignored.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let pairs: HashMap<&str, &str> = pairs.into_iter().collect();
        Self::collect(|name| pairs.get(name).map(|v| v.to_string()))
    }

    fn collect(mut lookup: impl FnMut(&str) -> Option<String>) -> Self {
        let mut values = HashMap::new();
        for setting in Setting::ALL {
            for source in setting.sources() {
                if let Some(value) = lookup(source.name) {
                    let value = value.trim();
                    if !value.is_empty() {
                        values.insert(source.name, value.to_string());
                    }
                }
            }
        }
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// First set source for `setting` in precedence order.
    pub fn lookup(&self, setting: Setting) -> Option<(NamedSource, &str)> {
        setting
            .sources()
            .into_iter()
            .find_map(|source| self.get(source.name).map(|value| (source, value)))
    }
}

impl fmt::Debug for ConfigSources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.values.keys().collect();
        names.sort();
        f.debug_struct("ConfigSources").field("set", &names).finish()
    }
}

/// Effective provider and credential for one request.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub provider: String,
    pub credential: Option<String>,
}

impl ResolvedConfig {
    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("provider", &self.provider)
            .field("has_credential", &self.has_credential())
            .finish()
    }
}

/// Resolve the effective provider and its credential.
///
/// Never fails: a missing credential only becomes an error once a provider
/// that needs one is dispatched to.
pub fn resolve(sources: &ConfigSources) -> ResolvedConfig {
    let provider = match sources.lookup(Setting::Provider) {
        Some((source, value)) => {
            debug!(source = source.name, provider = value, "provider selected");
            value.to_string()
        }
        None => {
            debug!(provider = DEFAULT_PROVIDER, "no provider configured, using default");
            DEFAULT_PROVIDER.to_string()
        }
    };

    let credential = Setting::credential_for(&provider)
        .and_then(|setting| sources.lookup(setting))
        .map(|(source, value)| {
            debug!(source = source.name, "credential source");
            value.to_string()
        });

    ResolvedConfig {
        provider,
        credential,
    }
}
