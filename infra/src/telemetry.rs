//! Tracing subscriber setup
//!
//! `RUST_LOG` takes precedence over the configured level when it is set.

use tracing_subscriber::EnvFilter;

use tv_shared::{LogFormat, LoggingConfig};

use crate::InfrastructureError;

/// Install the global tracing subscriber described by `config`
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), InfrastructureError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_filter(&config.level)?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };

    result.map_err(|e| InfrastructureError::Config(format!("Failed to initialize tracing: {}", e)))
}

/// Parse a level or directive list such as `info,tv_core=debug`
pub fn build_filter(directives: &str) -> Result<EnvFilter, InfrastructureError> {
    EnvFilter::try_new(directives).map_err(|e| {
        InfrastructureError::Config(format!("Invalid log filter '{}': {}", directives, e))
    })
}
