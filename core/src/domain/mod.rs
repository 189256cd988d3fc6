//! Domain layer containing the user record and signed credential entities.

pub mod entities;

// Re-export commonly used domain types
pub use entities::*;
