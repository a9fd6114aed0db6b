//! In-memory credential repository implementation

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::credential::{Credential, CredentialId, CredentialRepository, NewCredential};
use crate::domain::DomainError;

#[derive(Debug)]
struct Inner {
    credentials: HashMap<CredentialId, Credential>,
    /// Index for username -> credential ID lookup
    username_index: HashMap<String, CredentialId>,
    next_id: i64,
}

/// In-memory implementation of CredentialRepository
///
/// The uniqueness check and the insert happen under one write lock.
#[derive(Debug)]
pub struct InMemoryCredentialRepository {
    inner: RwLock<Inner>,
}

impl InMemoryCredentialRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                credentials: HashMap::new(),
                username_index: HashMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for InMemoryCredentialRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialRepository for InMemoryCredentialRepository {
    async fn get(&self, id: CredentialId) -> Result<Option<Credential>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner.credentials.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, DomainError> {
        let inner = self.inner.read().await;

        Ok(inner
            .username_index
            .get(username)
            .and_then(|id| inner.credentials.get(id))
            .cloned())
    }

    async fn create(&self, credential: NewCredential) -> Result<Credential, DomainError> {
        let mut inner = self.inner.write().await;

        if inner.username_index.contains_key(&credential.username) {
            return Err(DomainError::already_exists(format!(
                "Username '{}' already exists",
                credential.username
            )));
        }

        let id = CredentialId::new(inner.next_id);
        inner.next_id += 1;

        let stored = Credential::restore(
            id,
            credential.username.clone(),
            credential.password_hash,
            Utc::now(),
        );

        inner.username_index.insert(credential.username, id);
        inner.credentials.insert(id, stored.clone());

        Ok(stored)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.inner.read().await.credentials.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let repo = InMemoryCredentialRepository::new();

        let first = repo.create(NewCredential::new("alice", "h1")).await.unwrap();
        let second = repo.create(NewCredential::new("bob", "h2")).await.unwrap();

        assert_eq!(first.id().value(), 1);
        assert_eq!(second.id().value(), 2);
    }

    #[tokio::test]
    async fn test_get_and_find_by_username() {
        let repo = InMemoryCredentialRepository::new();
        let created = repo.create(NewCredential::new("alice", "h1")).await.unwrap();

        let by_id = repo.get(created.id()).await.unwrap().unwrap();
        assert_eq!(by_id.username(), "alice");
        assert_eq!(by_id.password_hash(), "h1");

        let by_name = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id(), created.id());

        assert!(repo.find_by_username("nobody").await.unwrap().is_none());
        assert!(repo.get(CredentialId::new(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_username_uniqueness() {
        let repo = InMemoryCredentialRepository::new();
        repo.create(NewCredential::new("alice", "h1")).await.unwrap();

        let result = repo.create(NewCredential::new("alice", "h2")).await;
        assert!(matches!(result, Err(DomainError::AlreadyExists { .. })));

        // Rejected create leaves the original untouched
        let stored = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(stored.password_hash(), "h1");
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_usernames_are_case_sensitive() {
        let repo = InMemoryCredentialRepository::new();

        repo.create(NewCredential::new("alice", "h1")).await.unwrap();
        repo.create(NewCredential::new("Alice", "h2")).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_create_same_username() {
        let repo = Arc::new(InMemoryCredentialRepository::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move {
                    repo.create(NewCredential::new("alice", format!("hash-{}", i)))
                        .await
                })
            })
            .collect();

        let mut successes = 0;
        let mut conflicts = 0;

        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(DomainError::AlreadyExists { .. }) => conflicts += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(conflicts, 15);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_health_check() {
        let repo = InMemoryCredentialRepository::new();
        assert!(repo.health_check().await.is_ok());
    }
}
