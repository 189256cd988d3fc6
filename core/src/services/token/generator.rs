//! Credential generation with a fixed validity window

use chrono::{DateTime, Duration, Utc};

use crate::domain::entities::credential::CredentialClaims;
use crate::errors::{DomainError, DomainResult};

use super::config::TokenServiceConfig;
use super::signer::{CredentialSigner, CredentialStatus};

/// Builds claims for a user and seals them with the signer
pub struct CredentialGenerator<S: CredentialSigner> {
    signer: S,
    issuer: String,
    lifetime: Duration,
}

impl<S: CredentialSigner> CredentialGenerator<S> {
    /// Fails with a configuration error for a non-positive lifetime
    pub fn new(signer: S, issuer: impl Into<String>, lifetime: Duration) -> DomainResult<Self> {
        if lifetime <= Duration::zero() {
            return Err(DomainError::Configuration {
                message: format!("Credential lifetime must be positive, got {}", lifetime),
            });
        }

        Ok(Self {
            signer,
            issuer: issuer.into(),
            lifetime,
        })
    }

    pub fn from_config(signer: S, config: &TokenServiceConfig) -> DomainResult<Self> {
        config.validate()?;
        Self::new(signer, config.issuer.clone(), config.lifetime()?)
    }

    /// Generate a credential for `user_id` issued now
    pub fn generate(&self, user_id: &str) -> DomainResult<String> {
        self.generate_at(user_id, Utc::now())
    }

    /// Generate a credential for `user_id` issued at `issued_at`
    pub fn generate_at(&self, user_id: &str, issued_at: DateTime<Utc>) -> DomainResult<String> {
        if user_id.is_empty() {
            return Err(DomainError::Validation {
                message: "User id must not be empty".to_string(),
            });
        }

        let claims = CredentialClaims::new(user_id, self.issuer.as_str(), issued_at, self.lifetime)?;
        self.signer.sign(&claims)
    }

    /// Verify a serialized credential
    pub fn verify(&self, credential: &str) -> CredentialStatus {
        self.signer.verify(credential)
    }
}
