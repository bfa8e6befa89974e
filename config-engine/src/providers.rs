// Configuration sources: built-in defaults, an optional file, then the environment
use crate::error::Result;
use crate::settings::AppConfig;
use crate::validation::ConfigValidator;
use config::{Config, Environment, File};
use std::path::Path;

/// Prefix for environment overrides, e.g. `CAREDESK__SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "CAREDESK";

/// Loads [`AppConfig`] from layered sources
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    file: Option<String>,
    load_dotenv: bool,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read this file if it exists (YAML, TOML or JSON by extension)
    pub fn with_file(mut self, path: impl Into<String>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Load `.env` into the process environment first
    pub fn with_dotenv(mut self) -> Self {
        self.load_dotenv = true;
        self
    }

    pub fn load(&self) -> Result<AppConfig> {
        if self.load_dotenv {
            if let Ok(path) = dotenvy::dotenv() {
                tracing::debug!(path = %path.display(), "Loaded .env file");
            }
        }

        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        if let Some(path) = &self.file {
            if Path::new(path).exists() {
                tracing::info!(path = %path, "Loading configuration file");
            }
            builder = builder.add_source(File::with_name(path).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
