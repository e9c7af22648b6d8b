use std::path::{Path, PathBuf};

use eztodo_common::{Error, Result};
use tracing::{debug, info};

use crate::model::AppConfig;

/// Reads [`AppConfig`] from a YAML file.
///
/// An explicitly requested file must exist. Without one, `~/.eztodo/config.yml`
/// is used when present and built-in defaults otherwise.
pub struct ConfigLoader {
    path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { path: None }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".eztodo").join("config.yml"))
    }

    pub fn load(&self) -> Result<AppConfig> {
        if let Some(path) = &self.path {
            return Self::read(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => Self::read(&path),
            _ => {
                debug!("no config file found, using defaults");
                Ok(AppConfig::default())
            }
        }
    }

    fn read(path: &Path) -> Result<AppConfig> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        let config = Self::parse(&contents)
            .map_err(|e| Error::Config(format!("invalid config {}: {e}", path.display())))?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    fn parse(contents: &str) -> std::result::Result<AppConfig, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(AppConfig::default());
        }
        serde_yaml::from_str(contents)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
