//! Shared error codes

/// Stable machine-readable codes for every failure a caller can observe
pub mod error_codes {
    pub const USER_NOT_FOUND: &str = "USER_NOT_FOUND";
    pub const NO_TOKEN_FOUND: &str = "NO_TOKEN_FOUND";
    pub const TOKEN_COLLISION: &str = "TOKEN_COLLISION";
    pub const TOKEN_INVALID: &str = "TOKEN_INVALID";
    pub const TOKEN_EXPIRED: &str = "TOKEN_EXPIRED";
    pub const TOKEN_GENERATION_FAILED: &str = "TOKEN_GENERATION_FAILED";
    pub const DIRECTORY_ERROR: &str = "DIRECTORY_ERROR";
    pub const DECRYPTION_ERROR: &str = "DECRYPTION_ERROR";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const CONFIGURATION_ERROR: &str = "CONFIGURATION_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}
