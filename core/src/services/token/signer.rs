//! Signing primitive for credentials

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use crate::domain::entities::credential::CredentialClaims;
use crate::errors::{DomainError, DomainResult, TokenError};

/// Outcome of verifying a signed credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialStatus {
    /// Signature intact and not yet expired
    Valid(CredentialClaims),
    /// Signature intact but past its expiry
    Expired,
    /// Bad signature, malformed payload or wrong issuer
    Invalid,
}

/// Produces and verifies signed, time-bound credentials
pub trait CredentialSigner: Send + Sync {
    /// Seal claims into a serialized credential
    fn sign(&self, claims: &CredentialClaims) -> DomainResult<String>;

    /// Verify signature and freshness of a serialized credential
    fn verify(&self, credential: &str) -> CredentialStatus;
}

/// HS256 JWT signer keyed by the shared secret
pub struct JwtCredentialSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtCredentialSigner {
    /// Creates a signer for the given shared secret and issuer
    ///
    /// # Returns
    ///
    /// A new `JwtCredentialSigner` or a configuration error if the secret is empty
    pub fn new(shared_secret: &str, issuer: &str) -> DomainResult<Self> {
        if shared_secret.is_empty() {
            return Err(DomainError::Configuration {
                message: "Shared secret must not be empty".to_string(),
            });
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.validate_exp = true;
        // Expiry is exact: a credential is expired one second past `exp`
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(shared_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(shared_secret.as_bytes()),
            validation,
        })
    }
}

impl CredentialSigner for JwtCredentialSigner {
    fn sign(&self, claims: &CredentialClaims) -> DomainResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "Failed to encode credential");
            DomainError::Token(TokenError::TokenGenerationFailed)
        })
    }

    fn verify(&self, credential: &str) -> CredentialStatus {
        match decode::<CredentialClaims>(credential, &self.decoding_key, &self.validation) {
            Ok(data) => CredentialStatus::Valid(data.claims),
            Err(e) if e.kind() == &ErrorKind::ExpiredSignature => CredentialStatus::Expired,
            Err(e) => {
                tracing::debug!(error = %e, "Credential rejected");
                CredentialStatus::Invalid
            }
        }
    }
}
