//! # TokenVault Core
//!
//! Domain layer of the authorization token vault.
//! This crate contains the user and credential entities, the token lifecycle
//! service, the user directory interface and the error types shared by
//! every layer on top of it.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod errors;

// Re-export commonly used types for convenience
pub use domain::entities::{CredentialClaims, UserRecord};
pub use errors::{DomainError, DomainResult, TokenError};
pub use repositories::{MockUserRepository, UserRepository};
pub use services::{
    AesGcmTokenCipher, AuthorizationTokenService, CredentialGenerator, CredentialSigner,
    CredentialStatus, JwtCredentialSigner, TokenCipher, TokenServiceConfig,
};
