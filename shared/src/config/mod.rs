//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - Token signing, encryption and lifetime configuration
//! - `database` - User directory connection and pool configuration
//! - `environment` - Environment detection and logging configuration
//!
//! [`AppConfig::load`] layers, in increasing priority: built-in defaults,
//! an optional `config/<environment>.toml` file and `TOKENVAULT__*`
//! environment variables (`TOKENVAULT__TOKEN__SHARED_SECRET`, ...).

pub mod auth;
pub mod database;
pub mod environment;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export commonly used types
pub use auth::{TokenConfig, MAX_ISSUER_LEN, MAX_LIFETIME_MINUTES};
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};

/// Prefix of environment variables overriding configuration values
pub const ENV_PREFIX: &str = "TOKENVAULT";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// User directory configuration
    pub database: DatabaseConfig,

    /// Token configuration
    pub token: TokenConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            database: DatabaseConfig::default(),
            token: TokenConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Defaults for the given environment, before any file or variable is applied
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            environment,
            logging: LoggingConfig::for_environment(environment),
            ..Default::default()
        }
    }

    /// Load configuration for the environment detected from the process
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_for(Environment::from_env())
    }

    /// Load and validate configuration for a specific environment
    pub fn load_for(environment: Environment) -> Result<Self, ConfigError> {
        let defaults = Self::for_environment(environment);

        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&defaults)?)
            .add_source(config::File::with_name(environment.config_file()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut loaded: Self = settings.try_deserialize()?;
        loaded.environment = environment;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Validate all sub-configurations
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.token.validate(self.environment)?;
        self.database.validate()?;
        Ok(())
    }
}
