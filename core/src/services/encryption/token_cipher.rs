//! Stored token encryption using AES-256-GCM
//!
//! A stored token is `base64url(nonce || ciphertext || tag)` with a fresh
//! 96-bit nonce per encryption, so encrypting the same credential twice
//! yields two different stored tokens.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL, Engine};
use rand::{rngs::OsRng, RngCore};
use tv_shared::TokenConfig;

use crate::errors::{DomainError, DomainResult};

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Trait defining stored token encryption operations
pub trait TokenCipher: Send + Sync {
    /// Encrypt a serialized signed credential into a stored token
    fn encrypt(&self, plaintext: &str) -> DomainResult<String>;

    /// Decrypt a stored token back into the serialized signed credential
    ///
    /// Fails with [`DomainError::Decryption`] on malformed or tampered input.
    fn decrypt(&self, ciphertext: &str) -> DomainResult<String>;
}

/// AES-GCM based stored token encryption
pub struct AesGcmTokenCipher {
    cipher: Aes256Gcm,
}

impl AesGcmTokenCipher {
    /// Create a cipher from a 256-bit key
    pub fn new(key: &[u8]) -> DomainResult<Self> {
        let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| DomainError::Validation {
            message: format!("Encryption key must be 32 bytes (256 bits), got {}", key.len()),
        })?;

        Ok(Self { cipher })
    }

    /// Create a cipher from the configured base64 key
    pub fn from_config(config: &TokenConfig) -> DomainResult<Self> {
        let key = config.encryption_key_bytes()?;
        Self::new(&key)
    }

    /// Generate a new random 256-bit key
    pub fn generate_key() -> Vec<u8> {
        let mut key = vec![0u8; 32];
        OsRng.fill_bytes(&mut key);
        key
    }

    /// Generate a random nonce for AES-GCM
    fn generate_nonce() -> [u8; NONCE_LEN] {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        nonce
    }
}

impl TokenCipher for AesGcmTokenCipher {
    fn encrypt(&self, plaintext: &str) -> DomainResult<String> {
        let nonce = Self::generate_nonce();

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|e| DomainError::Internal {
                message: format!("Encryption failed: {}", e),
            })?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);

        Ok(BASE64_URL.encode(sealed))
    }

    fn decrypt(&self, ciphertext: &str) -> DomainResult<String> {
        let sealed = BASE64_URL
            .decode(ciphertext.trim())
            .map_err(|e| DomainError::Decryption {
                message: format!("Failed to decode stored token: {}", e),
            })?;

        if sealed.len() < NONCE_LEN + TAG_LEN {
            return Err(DomainError::Decryption {
                message: format!("Stored token too short: {} bytes", sealed.len()),
            });
        }

        let (nonce, body) = sealed.split_at(NONCE_LEN);

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), body)
            .map_err(|_| DomainError::Decryption {
                message: "Stored token failed authentication".to_string(),
            })?;

        String::from_utf8(plaintext).map_err(|e| DomainError::Decryption {
            message: format!("Decrypted token is not valid UTF-8: {}", e),
        })
    }
}
