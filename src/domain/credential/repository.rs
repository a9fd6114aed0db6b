//! Credential repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{Credential, CredentialId, NewCredential};
use crate::domain::DomainError;

/// Repository trait for credential storage
///
/// Implementations enforce username uniqueness atomically: of any number of
/// concurrent `create` calls for one username, exactly one succeeds and the
/// rest fail with `DomainError::AlreadyExists`.
#[async_trait]
pub trait CredentialRepository: Send + Sync + Debug {
    /// Get a credential by its store-assigned ID
    async fn get(&self, id: CredentialId) -> Result<Option<Credential>, DomainError>;

    /// Get a credential by username (for login)
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, DomainError>;

    /// Store a new credential, assigning its ID
    async fn create(&self, credential: NewCredential) -> Result<Credential, DomainError>;

    /// Count stored credentials
    async fn count(&self) -> Result<usize, DomainError>;

    /// Check that the store can serve requests
    async fn health_check(&self) -> Result<(), DomainError> {
        self.count().await.map(|_| ())
    }
}
