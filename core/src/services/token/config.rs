//! Configuration for the token service

use chrono::Duration;
use tv_shared::{TokenConfig, MAX_ISSUER_LEN, MAX_LIFETIME_MINUTES};

use crate::domain::entities::credential::{CREDENTIAL_ISSUER, CREDENTIAL_LIFETIME_MINUTES};
use crate::errors::{DomainError, DomainResult};

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Credential lifetime in minutes
    pub lifetime_minutes: i64,
    /// Attempts to find a unique stored token before failing with a collision
    pub max_issue_attempts: u32,
    /// Issuer claim
    pub issuer: String,
}

impl TokenServiceConfig {
    /// Rejects an out-of-range lifetime or an issuer that is empty, longer
    /// than [`MAX_ISSUER_LEN`] or not printable ASCII
    pub fn validate(&self) -> DomainResult<()> {
        self.lifetime()?;

        if self.issuer.is_empty()
            || self.issuer.len() > MAX_ISSUER_LEN
            || !self.issuer.bytes().all(|b| b.is_ascii_graphic())
        {
            return Err(DomainError::Configuration {
                message: format!(
                    "Issuer must be 1 to {} printable ASCII characters",
                    MAX_ISSUER_LEN
                ),
            });
        }

        Ok(())
    }

    /// Credential validity window
    ///
    /// Fails with a configuration error unless the lifetime is between one
    /// minute and [`MAX_LIFETIME_MINUTES`].
    pub fn lifetime(&self) -> DomainResult<Duration> {
        if !(1..=MAX_LIFETIME_MINUTES).contains(&self.lifetime_minutes) {
            return Err(DomainError::Configuration {
                message: format!(
                    "Credential lifetime must be between 1 and {} minutes, got {}",
                    MAX_LIFETIME_MINUTES, self.lifetime_minutes
                ),
            });
        }

        Duration::try_minutes(self.lifetime_minutes).ok_or_else(|| DomainError::Configuration {
            message: format!("Credential lifetime out of range: {}", self.lifetime_minutes),
        })
    }
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            lifetime_minutes: CREDENTIAL_LIFETIME_MINUTES,
            max_issue_attempts: 3,
            issuer: CREDENTIAL_ISSUER.to_string(),
        }
    }
}

impl From<&TokenConfig> for TokenServiceConfig {
    fn from(config: &TokenConfig) -> Self {
        Self {
            lifetime_minutes: config.lifetime_minutes,
            max_issue_attempts: config.max_issue_attempts,
            issuer: config.issuer.clone(),
        }
    }
}
