//! Application configuration.
//!
//! Aggregates configuration from all modules into a single Config struct
//! that can be loaded from YAML files or environment variables.

mod client;

pub use client::{AddressIndexConfig, LaunchConfig, RegistryConfig, DEFAULT_TIMEOUT_SECS};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "CCSVC_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "CCSVC";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "CCSVC_LOG";

use serde::Deserialize;

use crate::bus::PublishConfig;
use crate::cache::CacheConfig;
use crate::products::ProductsConfig;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),
}

/// Case events returned to agents.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaseEventsConfig {
    /// Event categories an agent may see; everything else is filtered out.
    pub whitelisted_event_categories: Vec<String>,
}

impl Default for CaseEventsConfig {
    fn default() -> Self {
        Self {
            whitelisted_event_categories: [
                "CASE_CREATED",
                "CASE_UPDATED",
                "RESPONSE_RECEIVED",
                "REFUSAL_RECEIVED",
                "FULFILMENT_REQUESTED",
                "ADDRESS_NOT_VALID",
                "ADDRESS_MODIFIED",
                "NEW_ADDRESS_REPORTED",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Case registry endpoint.
    pub registry: RegistryConfig,
    /// Address index endpoint.
    pub address_index: AddressIndexConfig,
    /// Questionnaire launch settings.
    pub launch: LaunchConfig,
    /// Case cache backend.
    pub cache: CacheConfig,
    /// Outbound event publishing.
    pub publish: PublishConfig,
    pub case_events: CaseEventsConfig,
    /// Product catalogue override.
    pub products: ProductsConfig,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `config.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
