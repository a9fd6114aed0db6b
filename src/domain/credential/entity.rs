//! Credential entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned credential identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialId(i64);

impl CredentialId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for CredentialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A credential that has not been stored yet
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub username: String,
    pub password_hash: String,
}

impl NewCredential {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }
}

/// A registered user as held by the credential store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    id: CredentialId,
    username: String,
    /// Argon2 PHC string - never exposed in serialization
    #[serde(skip_serializing, default)]
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl Credential {
    /// Rebuild a credential from stored fields
    pub fn restore(
        id: CredentialId,
        username: impl Into<String>,
        password_hash: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            password_hash: password_hash.into(),
            created_at,
        }
    }

    pub fn id(&self) -> CredentialId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The view of this credential that may leave the service
    pub fn to_public(&self) -> PublicCredential {
        PublicCredential {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

/// Caller-safe credential info
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicCredential {
    pub id: CredentialId,
    pub username: String,
}
