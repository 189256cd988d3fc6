//! Authorization token lifecycle service

use std::sync::Arc;

use tv_shared::TokenConfig;

use crate::domain::entities::user::UserRecord;
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::UserRepository;
use crate::services::encryption::{AesGcmTokenCipher, TokenCipher};

use super::config::TokenServiceConfig;
use super::generator::CredentialGenerator;
use super::signer::{CredentialSigner, CredentialStatus, JwtCredentialSigner};

/// Service issuing, validating and refreshing per-user authorization tokens
///
/// Every token handed out is the encrypted form of a signed credential and
/// is persisted on the user's record before it is returned. A user holds at
/// most one token; no two users ever hold the same one.
pub struct AuthorizationTokenService<R, S = JwtCredentialSigner, C = AesGcmTokenCipher>
where
    R: UserRepository,
    S: CredentialSigner,
    C: TokenCipher,
{
    /// User directory
    repository: Arc<R>,
    /// Credential generator wrapping the signing primitive
    generator: CredentialGenerator<S>,
    /// Stored token encryption
    cipher: C,
    /// Service configuration
    config: TokenServiceConfig,
}

impl<R: UserRepository> AuthorizationTokenService<R> {
    /// Creates a service using the HS256 signer and AES-GCM cipher from configuration
    ///
    /// # Arguments
    ///
    /// * `repository` - User directory
    /// * `config` - Token configuration carrying the shared secret and encryption key
    pub fn from_config(repository: Arc<R>, config: &TokenConfig) -> DomainResult<Self> {
        let signer = JwtCredentialSigner::new(&config.shared_secret, &config.issuer)?;
        let cipher = AesGcmTokenCipher::from_config(config)?;

        Self::new(repository, signer, cipher, TokenServiceConfig::from(config))
    }
}

impl<R, S, C> AuthorizationTokenService<R, S, C>
where
    R: UserRepository,
    S: CredentialSigner,
    C: TokenCipher,
{
    /// Creates a new token service
    ///
    /// Fails with a configuration error when the credential lifetime is out
    /// of range.
    pub fn new(
        repository: Arc<R>,
        signer: S,
        cipher: C,
        config: TokenServiceConfig,
    ) -> DomainResult<Self> {
        let generator = CredentialGenerator::from_config(signer, &config)?;
        Ok(Self {
            repository,
            generator,
            cipher,
            config,
        })
    }

    /// The user directory backing this service
    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// The credential generator used for new tokens
    pub fn generator(&self) -> &CredentialGenerator<S> {
        &self.generator
    }

    /// Issues a brand-new stored token for a user
    ///
    /// Any token the user already holds is replaced.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The new stored (encrypted) token, already persisted
    /// * `Err(TokenError::UserNotFound)` - No such user
    /// * `Err(TokenError::TokenCollision)` - No unique candidate within the attempt budget
    pub async fn issue(&self, user_id: &str) -> DomainResult<String> {
        let user = self.find_user(user_id).await?;

        let token = self.store_unique_token(&user.id).await?;

        tracing::info!(
            user_id = %user.id,
            replaced = user.has_token(),
            event = "token_issued",
            "Issued authorization token"
        );

        Ok(token)
    }

    /// Validates the user's stored token, refreshing it if it has expired
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The current stored token, or its freshly persisted replacement
    /// * `Err(TokenError::UserNotFound)` - No such user
    /// * `Err(TokenError::NoTokenFound)` - The user has no token
    /// * `Err(DomainError::Decryption)` - The stored token cannot be decrypted
    /// * `Err(TokenError::InvalidToken)` - Bad signature, malformed payload or foreign subject
    /// * `Err(TokenError::TokenCollision)` - Refresh could not find a unique candidate
    pub async fn validate_and_refresh(&self, user_id: &str) -> DomainResult<String> {
        let user = self.find_user(user_id).await?;

        let stored = user
            .stored_token()
            .ok_or_else(|| TokenError::NoTokenFound {
                user_id: user.id.clone(),
            })?
            .to_string();

        let credential = self.cipher.decrypt(&stored).map_err(|e| {
            tracing::warn!(
                user_id = %user.id,
                error = %e,
                event = "token_decryption_failed",
                "Stored authorization token could not be decrypted"
            );
            e
        })?;

        match self.generator.verify(&credential) {
            CredentialStatus::Valid(claims) if claims.belongs_to(&user.id) => {
                tracing::debug!(user_id = %user.id, "Authorization token still valid");
                Ok(stored)
            }
            CredentialStatus::Valid(claims) => {
                tracing::warn!(
                    user_id = %user.id,
                    subject = %claims.sub,
                    event = "token_subject_mismatch",
                    "Stored credential identifies a different user"
                );
                Err(TokenError::InvalidToken.into())
            }
            CredentialStatus::Expired => {
                let token = self.store_unique_token(&user.id).await?;

                tracing::info!(
                    user_id = %user.id,
                    event = "token_refreshed",
                    "Refreshed expired authorization token"
                );

                Ok(token)
            }
            CredentialStatus::Invalid => {
                tracing::warn!(
                    user_id = %user.id,
                    event = "token_invalid",
                    "Stored authorization token failed verification"
                );
                Err(TokenError::InvalidToken.into())
            }
        }
    }

    /// Resolves a presented stored token to the user holding it
    ///
    /// Expired tokens are rejected rather than refreshed; only the holder
    /// refreshes through [`validate_and_refresh`](Self::validate_and_refresh).
    ///
    /// # Returns
    ///
    /// * `Ok(UserRecord)` - The holder of a valid token
    /// * `Err(TokenError::InvalidToken)` - Unknown, malformed or foreign token
    /// * `Err(TokenError::TokenExpired)` - The token has lapsed
    /// * `Err(DomainError::Decryption)` - The token cannot be decrypted
    pub async fn authenticate(&self, stored_token: &str) -> DomainResult<UserRecord> {
        if stored_token.is_empty() {
            return Err(TokenError::InvalidToken.into());
        }

        let holder = self
            .repository
            .find_by_authorization_token(stored_token)
            .await?
            .ok_or(TokenError::InvalidToken)?;

        let credential = self.cipher.decrypt(stored_token)?;

        match self.generator.verify(&credential) {
            CredentialStatus::Valid(claims) if claims.belongs_to(&holder.id) => Ok(holder),
            CredentialStatus::Expired => Err(TokenError::TokenExpired.into()),
            _ => {
                tracing::warn!(
                    user_id = %holder.id,
                    event = "token_invalid",
                    "Presented authorization token failed verification"
                );
                Err(TokenError::InvalidToken.into())
            }
        }
    }

    async fn find_user(&self, user_id: &str) -> DomainResult<UserRecord> {
        if user_id.is_empty() {
            return Err(DomainError::Validation {
                message: "User id must not be empty".to_string(),
            });
        }

        self.repository
            .find_by_id(user_id)
            .await
            .map_err(|e| {
                tracing::error!(user_id, error = %e, "User lookup failed");
                e
            })?
            .ok_or_else(|| {
                TokenError::UserNotFound {
                    user_id: user_id.to_string(),
                }
                .into()
            })
    }

    /// Mints a candidate token and persists it once no other record holds it
    ///
    /// A candidate collides when the lookup finds a holder (the user itself
    /// included) or when the directory rejects the write as a duplicate.
    async fn store_unique_token(&self, user_id: &str) -> DomainResult<String> {
        let attempts = self.config.max_issue_attempts.max(1);

        for attempt in 1..=attempts {
            let credential = self.generator.generate(user_id)?;
            let candidate = self.cipher.encrypt(&credential)?;

            if let Some(holder) = self
                .repository
                .find_by_authorization_token(&candidate)
                .await?
            {
                tracing::warn!(
                    user_id,
                    holder_id = %holder.id,
                    attempt,
                    event = "token_collision",
                    "Candidate token already held by a user"
                );
                continue;
            }

            match self
                .repository
                .update_authorization_token(user_id, &candidate)
                .await
            {
                Ok(()) => return Ok(candidate),
                Err(e) if e.is_collision() => {
                    tracing::warn!(
                        user_id,
                        attempt,
                        event = "token_collision",
                        "Directory rejected duplicate token on write"
                    );
                }
                Err(e) => {
                    tracing::error!(user_id, error = %e, "Failed to persist authorization token");
                    return Err(e);
                }
            }
        }

        tracing::error!(
            user_id,
            attempts,
            event = "token_collision_exhausted",
            "Could not mint a unique authorization token"
        );

        Err(TokenError::TokenCollision.into())
    }
}
