//! Shared utilities and common types for TokenVault
//!
//! This crate provides functionality used across all workspace members:
//! - Configuration types and the layered configuration loader
//! - Stable error codes

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, ConfigError, DatabaseConfig, Environment, LogFormat, LoggingConfig, TokenConfig,
    MAX_ISSUER_LEN, MAX_LIFETIME_MINUTES,
};
pub use errors::error_codes;
