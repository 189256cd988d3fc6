//! Token lifecycle error types
//!
//! These errors represent the failure outcomes of issuing, validating,
//! refreshing and authenticating stored authorization tokens.

use thiserror::Error;

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("User not found: {user_id}")]
    UserNotFound { user_id: String },

    #[error("No authorization token found for user: {user_id}")]
    NoTokenFound { user_id: String },

    #[error("Token already exists")]
    TokenCollision,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token generation failed")]
    TokenGenerationFailed,
}
