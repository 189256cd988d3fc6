//! # Infrastructure Layer
//!
//! Concrete adapters for the TokenVault core:
//! - **Database**: the MySQL user directory using SQLx, with embedded migrations
//! - **Telemetry**: `tracing` subscriber setup driven by configuration
//! - **Bootstrap**: wiring configuration, directory and token service together
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

use std::sync::Arc;

use tv_core::services::AuthorizationTokenService;
use tv_shared::{AppConfig, Environment};

// Re-export core types for convenience
pub use tv_core::errors::*;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Tracing subscriber setup
pub mod telemetry;

#[cfg(feature = "mysql")]
use database::{DatabasePool, MySqlUserRepository};

/// Token service backed by the MySQL user directory
#[cfg(feature = "mysql")]
pub type MySqlTokenService = AuthorizationTokenService<MySqlUserRepository>;

/// Running infrastructure: the pool and the token service built on it
#[cfg(feature = "mysql")]
#[derive(Clone)]
pub struct InfrastructureServices {
    /// Database connection pool
    pub pool: DatabasePool,
    /// Token lifecycle service
    pub token_service: Arc<MySqlTokenService>,
}

/// Load configuration, install tracing and connect the token service
///
/// This function sets up:
/// - Environment variables from `.env.<environment>` and `.env`
/// - Layered configuration (`config/<environment>.toml`, `TOKENVAULT__*`)
/// - The global tracing subscriber
/// - The database pool and, when enabled, schema migrations
#[cfg(feature = "mysql")]
pub async fn initialize() -> Result<InfrastructureServices, InfrastructureError> {
    let config = load_config()?;
    telemetry::init_tracing(&config.logging)?;

    initialize_with(config).await
}

/// Connect the token service using an already loaded configuration
#[cfg(feature = "mysql")]
pub async fn initialize_with(
    config: AppConfig,
) -> Result<InfrastructureServices, InfrastructureError> {
    tracing::info!(environment = %config.environment, "Initializing infrastructure services");

    config
        .validate()
        .map_err(|e| InfrastructureError::Config(e.to_string()))?;

    let pool = DatabasePool::new(config.database.clone()).await?;
    if config.database.run_migrations {
        pool.run_migrations().await?;
    }

    let repository = Arc::new(MySqlUserRepository::new(pool.get_pool().clone()));
    let token_service = AuthorizationTokenService::from_config(repository, &config.token)?;

    if config.token.is_using_default_secret() {
        tracing::warn!("Token service is running with the built-in development secret");
    }

    tracing::info!("Infrastructure services initialized successfully");

    Ok(InfrastructureServices {
        pool,
        token_service: Arc::new(token_service),
    })
}

/// Load configuration for the current environment
///
/// Missing `.env` files are ignored.
pub fn load_config() -> Result<AppConfig, InfrastructureError> {
    let environment = Environment::from_env();
    dotenvy::from_filename(environment.env_file()).ok();
    dotenvy::dotenv().ok();

    AppConfig::load_for(environment).map_err(|e| InfrastructureError::Config(e.to_string()))
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error raised while building domain services
    #[error(transparent)]
    Domain(#[from] DomainError),
}
