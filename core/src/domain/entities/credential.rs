//! Signed credential payload.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::TokenError;

/// Credential lifetime (1 hour)
pub const CREDENTIAL_LIFETIME_MINUTES: i64 = 60;

/// Default issuer claim
pub const CREDENTIAL_ISSUER: &str = "tokenvault";

/// Claims sealed inside every signed credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialClaims {
    /// Subject (user id)
    pub sub: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Credential ID (unique per issuance)
    pub jti: String,
}

impl CredentialClaims {
    /// Creates claims for a user issued at `issued_at` and valid for `lifetime`
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user the credential identifies
    /// * `issuer` - Issuer claim
    /// * `issued_at` - Issuance time
    /// * `lifetime` - Validity window
    ///
    /// Fails with `TokenGenerationFailed` when the expiry is not representable.
    pub fn new(
        user_id: impl Into<String>,
        issuer: impl Into<String>,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<Self, TokenError> {
        let expiry = issued_at
            .checked_add_signed(lifetime)
            .ok_or(TokenError::TokenGenerationFailed)?;

        Ok(Self {
            sub: user_id.into(),
            iat: issued_at.timestamp(),
            exp: expiry.timestamp(),
            iss: issuer.into(),
            jti: Uuid::new_v4().to_string(),
        })
    }

    /// Checks whether the credential identifies the given user
    pub fn belongs_to(&self, user_id: &str) -> bool {
        self.sub == user_id
    }
}
