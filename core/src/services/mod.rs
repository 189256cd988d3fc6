//! Business services containing the token lifecycle.

pub mod encryption;
pub mod token;

// Re-export commonly used types
pub use encryption::{AesGcmTokenCipher, TokenCipher};
pub use token::{
    AuthorizationTokenService, CredentialGenerator, CredentialSigner, CredentialStatus,
    JwtCredentialSigner, TokenServiceConfig,
};
