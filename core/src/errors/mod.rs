//! Domain-specific error types and error handling.

mod types;


pub use types::TokenError;

use thiserror::Error;
use tv_shared::error_codes;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Directory error: {message}")]
    Directory { message: String },

    #[error("Decryption failed: {message}")]
    Decryption { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } => error_codes::VALIDATION_ERROR,
            DomainError::Directory { .. } => error_codes::DIRECTORY_ERROR,
            DomainError::Decryption { .. } => error_codes::DECRYPTION_ERROR,
            DomainError::Configuration { .. } => error_codes::CONFIGURATION_ERROR,
            DomainError::Internal { .. } => error_codes::INTERNAL_ERROR,
            DomainError::Token(token_error) => match token_error {
                TokenError::UserNotFound { .. } => error_codes::USER_NOT_FOUND,
                TokenError::NoTokenFound { .. } => error_codes::NO_TOKEN_FOUND,
                TokenError::TokenCollision => error_codes::TOKEN_COLLISION,
                TokenError::InvalidToken => error_codes::TOKEN_INVALID,
                TokenError::TokenExpired => error_codes::TOKEN_EXPIRED,
                TokenError::TokenGenerationFailed => error_codes::TOKEN_GENERATION_FAILED,
            },
        }
    }

    /// Whether the directory rejected a write because the token is taken
    pub fn is_collision(&self) -> bool {
        matches!(self, DomainError::Token(TokenError::TokenCollision))
    }
}

impl From<tv_shared::ConfigError> for DomainError {
    fn from(error: tv_shared::ConfigError) -> Self {
        DomainError::Configuration {
            message: error.to_string(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
