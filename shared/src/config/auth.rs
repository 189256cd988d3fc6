//! Token signing and encryption configuration

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

use super::{ConfigError, Environment};

/// Longest accepted credential lifetime (one year)
pub const MAX_LIFETIME_MINUTES: i64 = 365 * 24 * 60;

/// Longest accepted issuer claim, in bytes
pub const MAX_ISSUER_LEN: usize = 64;

const DEFAULT_SHARED_SECRET: &str = "development-secret-please-change-in-production";

/// Base64 of the 32-byte development key `development-key-change-me-000000`
const DEFAULT_ENCRYPTION_KEY: &str = "ZGV2ZWxvcG1lbnQta2V5LWNoYW5nZS1tZS0wMDAwMDA=";

/// Authorization token configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    /// HMAC secret shared with the services that verify credentials
    pub shared_secret: String,

    /// Base64-encoded 256-bit key for encrypting stored tokens
    pub encryption_key: String,

    /// Credential lifetime in minutes
    #[serde(default = "default_lifetime_minutes")]
    pub lifetime_minutes: i64,

    /// Attempts to find a unique stored token before giving up
    #[serde(default = "default_max_issue_attempts")]
    pub max_issue_attempts: u32,

    /// Issuer claim embedded in every credential
    #[serde(default = "default_issuer")]
    pub issuer: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            shared_secret: String::from(DEFAULT_SHARED_SECRET),
            encryption_key: String::from(DEFAULT_ENCRYPTION_KEY),
            lifetime_minutes: default_lifetime_minutes(),
            max_issue_attempts: default_max_issue_attempts(),
            issuer: default_issuer(),
        }
    }
}

impl TokenConfig {
    /// Create a new token configuration with secret and key
    pub fn new(shared_secret: impl Into<String>, encryption_key: impl Into<String>) -> Self {
        Self {
            shared_secret: shared_secret.into(),
            encryption_key: encryption_key.into(),
            ..Default::default()
        }
    }

    /// Set the credential lifetime in minutes
    pub fn with_lifetime_minutes(mut self, minutes: i64) -> Self {
        self.lifetime_minutes = minutes;
        self
    }

    /// Set the maximum number of issuance attempts
    pub fn with_max_issue_attempts(mut self, attempts: u32) -> Self {
        self.max_issue_attempts = attempts;
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.shared_secret == DEFAULT_SHARED_SECRET || self.encryption_key == DEFAULT_ENCRYPTION_KEY
    }

    /// Decode the encryption key into raw key material
    pub fn encryption_key_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        let key = BASE64
            .decode(self.encryption_key.trim())
            .map_err(|e| ConfigError::Invalid {
                message: format!("token.encryption_key is not valid base64: {}", e),
            })?;

        if key.len() != 32 {
            return Err(ConfigError::Invalid {
                message: format!(
                    "token.encryption_key must decode to 32 bytes, got {}",
                    key.len()
                ),
            });
        }

        Ok(key)
    }

    /// Validate the configuration for the given environment
    pub fn validate(&self, environment: Environment) -> Result<(), ConfigError> {
        if self.shared_secret.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "token.shared_secret must not be empty".to_string(),
            });
        }

        if environment.is_production() && self.is_using_default_secret() {
            return Err(ConfigError::Invalid {
                message: "development token secrets cannot be used in production".to_string(),
            });
        }

        if !(1..=MAX_LIFETIME_MINUTES).contains(&self.lifetime_minutes) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "token.lifetime_minutes must be between 1 and {}, got {}",
                    MAX_LIFETIME_MINUTES, self.lifetime_minutes
                ),
            });
        }

        if self.issuer.is_empty()
            || self.issuer.len() > MAX_ISSUER_LEN
            || !self.issuer.bytes().all(|b| b.is_ascii_graphic())
        {
            return Err(ConfigError::Invalid {
                message: format!(
                    "token.issuer must be 1 to {} printable ASCII characters",
                    MAX_ISSUER_LEN
                ),
            });
        }

        if self.max_issue_attempts == 0 {
            return Err(ConfigError::Invalid {
                message: "token.max_issue_attempts must be at least 1".to_string(),
            });
        }

        self.encryption_key_bytes().map(|_| ())
    }
}

fn default_lifetime_minutes() -> i64 {
    60
}

fn default_max_issue_attempts() -> u32 {
    3
}

fn default_issuer() -> String {
    String::from("tokenvault")
}
