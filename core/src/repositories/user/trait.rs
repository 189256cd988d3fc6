//! User directory trait defining the interface for user record persistence.
//!
//! The directory maps an opaque user id to a [`UserRecord`] and is the only
//! place token state lives. Implementations must enforce that no two records
//! hold the same `authorization_token` at write time: a conflicting write is
//! reported as [`TokenError::TokenCollision`] rather than silently applied.
//!
//! [`TokenError::TokenCollision`]: crate::errors::TokenError::TokenCollision

use async_trait::async_trait;

use crate::domain::entities::user::UserRecord;
use crate::errors::DomainError;

/// Repository trait for the user directory
///
/// # Example Implementation
/// ```no_run
/// use async_trait::async_trait;
/// use tv_core::repositories::UserRepository;
/// use tv_core::domain::entities::user::UserRecord;
/// use tv_core::errors::DomainError;
///
/// struct RemoteDirectory {
///     // client handle
/// }
///
/// #[async_trait]
/// impl UserRepository for RemoteDirectory {
///     async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, DomainError> {
///         // Implementation here
///         Ok(None)
///     }
///
///     // ... other methods
/// #   async fn find_by_authorization_token(&self, _token: &str) -> Result<Option<UserRecord>, DomainError> { Ok(None) }
/// #   async fn create(&self, user: UserRecord) -> Result<UserRecord, DomainError> { Ok(user) }
/// #   async fn update_authorization_token(&self, _id: &str, _token: &str) -> Result<(), DomainError> { Ok(()) }
/// }
/// ```
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their identifier
    ///
    /// # Returns
    /// * `Ok(Some(UserRecord))` - User found
    /// * `Ok(None)` - No user with the given id
    /// * `Err(DomainError::Directory)` - The directory could not be queried
    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, DomainError>;

    /// Find the user currently holding a stored token
    ///
    /// # Returns
    /// * `Ok(Some(UserRecord))` - The holder of `token`
    /// * `Ok(None)` - No record holds `token`
    /// * `Err(DomainError::Directory)` - The directory could not be queried
    async fn find_by_authorization_token(
        &self,
        token: &str,
    ) -> Result<Option<UserRecord>, DomainError>;

    /// Enroll a new user record
    ///
    /// # Returns
    /// * `Ok(UserRecord)` - The created record
    /// * `Err(DomainError::Validation)` - A record with the same id exists
    /// * `Err(DomainError::Token(TokenError::TokenCollision))` - The record's
    ///   token is already held by another user
    async fn create(&self, user: UserRecord) -> Result<UserRecord, DomainError>;

    /// Replace the stored token of a user
    ///
    /// # Returns
    /// * `Ok(())` - Token persisted
    /// * `Err(DomainError::Token(TokenError::UserNotFound))` - No such user
    /// * `Err(DomainError::Token(TokenError::TokenCollision))` - Another
    ///   user already holds `token`
    /// * `Err(DomainError::Directory)` - The write failed
    async fn update_authorization_token(&self, id: &str, token: &str) -> Result<(), DomainError>;
}
