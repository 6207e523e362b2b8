//! Configuration Loader
//!
//! Environment-aware loading: detects the environment, merges the TOML files
//! and environment variables with the `config` crate, then validates.

use super::error::{ConfigResult, ConfigurationError};
use super::TicketingConfig;
use config::{Config, Environment, File};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

const BASE_FILE: &str = "ticketing.toml";
const ENV_PREFIX: &str = "TICKETING";

static GLOBAL_CONFIG: OnceLock<Arc<ConfigManager>> = OnceLock::new();

#[derive(Debug)]
pub struct ConfigManager {
    config: TicketingConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment.
    /// Tests use this to avoid touching process-wide environment variables.
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(|| PathBuf::from("config"));

        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            environment,
            config_directory.display()
        );

        let config = Self::load_and_merge_config(&config_directory, environment)?;
        config.validate()?;

        info!(
            environment = environment,
            database_host = %config.database.host,
            pool_size = config.database.pool,
            modules = config.modules.len(),
            "Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &TicketingConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Process-wide configuration, loaded on first use.
    ///
    /// Falls back to defaults (with a warning) if loading fails.
    pub fn global() -> Arc<ConfigManager> {
        GLOBAL_CONFIG
            .get_or_init(|| {
                Self::load().unwrap_or_else(|err| {
                    tracing::warn!(error = %err, "Falling back to default configuration");
                    let config = TicketingConfig {
                        environment: Self::detect_environment(),
                        ..Default::default()
                    };
                    Arc::new(ConfigManager {
                        environment: config.environment.clone(),
                        config,
                        config_directory: PathBuf::from("config"),
                    })
                })
            })
            .clone()
    }

    /// Detect current environment: TICKETING_ENV || APP_ENV || 'development'
    pub(crate) fn detect_environment() -> String {
        env::var("TICKETING_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }

    fn load_and_merge_config(
        config_directory: &Path,
        environment: &str,
    ) -> ConfigResult<TicketingConfig> {
        let base_file = config_directory.join(BASE_FILE);
        let env_file = config_directory.join(format!("ticketing.{environment}.toml"));

        let settings = Config::builder()
            .add_source(File::from(base_file.clone()).required(false))
            .add_source(File::from(env_file).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override("environment", environment)
            .map_err(|e| ConfigurationError::load_error("environment override", e))?
            .build()
            .map_err(|e| ConfigurationError::load_error(base_file.display().to_string(), e))?;

        settings
            .try_deserialize::<TicketingConfig>()
            .map_err(ConfigurationError::deserialization_error)
    }
}
