//! Configuration loader with layered sources.

use crate::{AppConfig, CacheBackend};
use config::{Config, ConfigError, Environment, File};
use ephemera_core::EphemeraError;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Configuration loader with runtime refresh support.
#[derive(Clone)]
pub struct ConfigLoader {
    config: Arc<RwLock<AppConfig>>,
    config_dir: String,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `config/default.toml` - Default values
    /// 2. `config/{environment}.toml` - Environment-specific overrides
    /// 3. `config/local.toml` - Local overrides
    /// 4. Environment variables with `EPHEMERA_` prefix (`__` between sections)
    pub fn new(config_dir: impl Into<String>) -> Result<Self, EphemeraError> {
        let config_dir = config_dir.into();
        let config = Self::load_config(&config_dir)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_dir,
        })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, EphemeraError> {
        Self::new("./config")
    }

    /// Returns the current configuration.
    pub async fn get(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Reloads the configuration from disk.
    pub async fn reload(&self) -> Result<(), EphemeraError> {
        let new_config = Self::load_config(&self.config_dir)?;
        let mut config = self.config.write().await;
        *config = new_config;
        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Loads configuration from the specified directory.
    fn load_config(config_dir: &str) -> Result<AppConfig, EphemeraError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment =
            std::env::var("EPHEMERA_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();

        for name in ["default", environment.as_str(), "local"] {
            let path = format!("{}/{}.toml", config_dir, name);
            if Path::new(&path).exists() {
                debug!("Loading config from: {}", path);
                builder = builder.add_source(File::with_name(&path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("EPHEMERA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_error)?;

        let mut app_config: AppConfig = config.try_deserialize().map_err(config_error)?;
        app_config.app.environment = environment;

        validate_config(&app_config)?;

        Ok(app_config)
    }
}

/// Validates the configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), EphemeraError> {
    if config.database.url.is_empty() {
        return Err(EphemeraError::Configuration("Database URL is required".to_string()));
    }

    if config.images.ttl_secs == 0 {
        return Err(EphemeraError::Configuration(
            "images.ttl_secs must be greater than zero".to_string(),
        ));
    }

    if config.images.key_length == 0 {
        return Err(EphemeraError::Configuration(
            "images.key_length must be greater than zero".to_string(),
        ));
    }

    if !(1..=100).contains(&config.images.jpeg_quality) {
        return Err(EphemeraError::Configuration(format!(
            "images.jpeg_quality must be within 1..=100, got {}",
            config.images.jpeg_quality
        )));
    }

    if config.cache.backend == CacheBackend::Redis && !config.redis.enabled {
        return Err(EphemeraError::Configuration(
            "cache.backend is 'redis' but redis.enabled is false".to_string(),
        ));
    }

    if config.cache.backend == CacheBackend::Memory && config.cache.max_entries == 0 {
        return Err(EphemeraError::Configuration(
            "cache.max_entries must be greater than zero for the memory backend".to_string(),
        ));
    }

    if config.images.key_length < 16 {
        warn!(
            "images.key_length is {}; short keys are easy to guess",
            config.images.key_length
        );
    }

    Ok(())
}

fn config_error(err: ConfigError) -> EphemeraError {
    EphemeraError::Configuration(err.to_string())
}
