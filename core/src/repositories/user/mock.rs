//! In-memory implementation of UserRepository for tests and embedding

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::user::UserRecord;
use crate::errors::{DomainError, TokenError};

use super::trait_::UserRepository;

/// Mock user repository
///
/// Token uniqueness is checked under the write lock, so concurrent writers
/// observe the same guarantee a unique index gives in the MySQL directory.
pub struct MockUserRepository {
    users: Arc<RwLock<HashMap<String, UserRecord>>>,
    token_writes: AtomicUsize,
    unavailable: AtomicBool,
    enforce_unique_tokens: bool,
}

impl MockUserRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            token_writes: AtomicUsize::new(0),
            unavailable: AtomicBool::new(false),
            enforce_unique_tokens: true,
        }
    }

    /// Create a repository that accepts duplicate tokens on write
    pub fn without_unique_constraint() -> Self {
        Self {
            enforce_unique_tokens: false,
            ..Self::new()
        }
    }

    /// Create a repository pre-populated with token-less users
    pub fn with_users<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let users = ids
            .into_iter()
            .map(|id| {
                let user = UserRecord::new(id);
                (user.id.clone(), user)
            })
            .collect();

        Self {
            users: Arc::new(RwLock::new(users)),
            ..Self::new()
        }
    }

    /// Number of successful token writes
    pub fn token_write_count(&self) -> usize {
        self.token_writes.load(Ordering::SeqCst)
    }

    /// Simulate the directory going down (or coming back)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Overwrite a stored token without any uniqueness check or write accounting
    pub async fn force_token(&self, id: &str, token: Option<String>) -> bool {
        let mut users = self.users.write().await;
        match users.get_mut(id) {
            Some(user) => {
                user.authorization_token = token;
                true
            }
            None => false,
        }
    }

    /// Copy of every record currently stored
    pub async fn snapshot(&self) -> Vec<UserRecord> {
        let users = self.users.read().await;
        users.values().cloned().collect()
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::Directory {
                message: "user directory unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn token_taken(users: &HashMap<String, UserRecord>, token: &str, except_id: &str) -> bool {
        users
            .values()
            .any(|u| u.id != except_id && u.stored_token() == Some(token))
    }
}

impl Default for MockUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, DomainError> {
        self.check_available()?;
        let users = self.users.read().await;
        Ok(users.get(id).cloned())
    }

    async fn find_by_authorization_token(
        &self,
        token: &str,
    ) -> Result<Option<UserRecord>, DomainError> {
        self.check_available()?;
        if token.is_empty() {
            return Ok(None);
        }
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.stored_token() == Some(token))
            .cloned())
    }

    async fn create(&self, user: UserRecord) -> Result<UserRecord, DomainError> {
        self.check_available()?;
        let mut users = self.users.write().await;

        if users.contains_key(&user.id) {
            return Err(DomainError::Validation {
                message: format!("User already exists: {}", user.id),
            });
        }

        if let Some(token) = user.stored_token() {
            if self.enforce_unique_tokens && Self::token_taken(&users, token, &user.id) {
                return Err(TokenError::TokenCollision.into());
            }
        }

        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn update_authorization_token(&self, id: &str, token: &str) -> Result<(), DomainError> {
        self.check_available()?;
        let mut users = self.users.write().await;

        if self.enforce_unique_tokens && Self::token_taken(&users, token, id) {
            return Err(TokenError::TokenCollision.into());
        }

        let user = users.get_mut(id).ok_or_else(|| TokenError::UserNotFound {
            user_id: id.to_string(),
        })?;

        user.authorization_token = Some(token.to_string());
        user.updated_at = Utc::now();
        self.token_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
