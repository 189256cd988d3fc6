//! Database module - MySQL implementations using SQLx
//!
//! This module provides the user directory backed by MySQL:
//! - Connection pool management and health checks
//! - Embedded schema migrations
//! - The `UserRepository` implementation

pub mod connection;
pub mod mysql;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::MySqlUserRepository;
