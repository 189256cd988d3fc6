//! Domain entities representing core business objects.

pub mod credential;
pub mod user;


// Re-export commonly used types
pub use credential::{CredentialClaims, CREDENTIAL_ISSUER, CREDENTIAL_LIFETIME_MINUTES};
pub use user::UserRecord;
