//! Token service module
//!
//! This module handles the authorization token lifecycle:
//! - Signed credential generation and verification (HS256 JWT)
//! - Issuance of unique encrypted stored tokens
//! - Validation with transparent refresh of expired tokens
//! - Resolution of a presented stored token to its holder

mod config;
mod generator;
mod service;
mod signer;

#[cfg(test)]
mod tests;

pub use config::TokenServiceConfig;
pub use generator::CredentialGenerator;
pub use service::AuthorizationTokenService;
pub use signer::{CredentialSigner, CredentialStatus, JwtCredentialSigner};
