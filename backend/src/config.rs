//! Configuration management for the Distillery Operations Platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with DISTILLERY__ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::config::{DEFAULT_BATCH_ID_KEYS, DEFAULT_COMBINED_HEARTS_KEY, DEFAULT_STILL_NAME};
use shared::EngineConfig;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Log output configuration
    pub logging: LoggingConfig,

    /// Import normalisation and merge settings
    pub engine: EngineSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of human-readable ones
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineSettings {
    /// Keys tried in order to find a record's batch id
    pub batch_id_keys: Vec<String>,

    /// Still recorded when an import record names none
    pub default_still_name: String,

    /// Key holding an operator's combined hearts total
    pub combined_hearts_key: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("DISTILLERY__ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let batch_id_keys: Vec<String> =
            DEFAULT_BATCH_ID_KEYS.iter().map(|k| k.to_string()).collect();

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("logging.json", false)?
            .set_default("engine.batch_id_keys", batch_id_keys)?
            .set_default("engine.default_still_name", DEFAULT_STILL_NAME)?
            .set_default("engine.combined_hearts_key", DEFAULT_COMBINED_HEARTS_KEY)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (DISTILLERY__ prefix)
            .add_source(
                Environment::with_prefix("DISTILLERY")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("engine.batch_id_keys")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Settings handed to the calculation engine
    pub fn engine_config(&self) -> EngineConfig {
        self.engine.clone().into()
    }
}

impl From<EngineSettings> for EngineConfig {
    fn from(settings: EngineSettings) -> Self {
        let defaults = EngineConfig::default();
        EngineConfig {
            batch_id_keys: if settings.batch_id_keys.is_empty() {
                defaults.batch_id_keys
            } else {
                settings.batch_id_keys
            },
            default_still_name: settings.default_still_name,
            combined_hearts_key: settings.combined_hearts_key,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            batch_id_keys: engine.batch_id_keys,
            default_still_name: engine.default_still_name,
            combined_hearts_key: engine.combined_hearts_key,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            engine: EngineSettings::default(),
        }
    }
}
