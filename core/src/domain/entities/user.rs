//! User record held by the user directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User record as stored in the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Opaque identifier, primary key in the directory
    pub id: String,

    /// Encrypted signed credential, if one has been issued
    pub authorization_token: Option<String>,

    /// Timestamp when the record was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the record was last updated
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Creates a new record without an authorization token
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            authorization_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the stored authorization token
    pub fn set_authorization_token(&mut self, token: impl Into<String>) {
        self.authorization_token = Some(token.into());
        self.updated_at = Utc::now();
    }

    /// Returns the stored token, treating an empty value as absent
    pub fn stored_token(&self) -> Option<&str> {
        self.authorization_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }

    /// Checks if the record currently holds a token
    pub fn has_token(&self) -> bool {
        self.stored_token().is_some()
    }
}
