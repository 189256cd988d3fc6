//! Encryption of signed credentials before they reach the user directory

pub mod token_cipher;

// Re-export main types
pub use token_cipher::{AesGcmTokenCipher, TokenCipher};
