//! Application state for shared services

use std::sync::Arc;

use crate::domain::{Credential, CredentialRepository, DomainError};
use crate::infrastructure::auth::{AuthService, IssuedToken, PasswordHasher, TokenService};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServiceTrait>,
    pub token_service: Arc<dyn TokenService>,
    pub credential_store: Arc<dyn CredentialRepository>,
}

/// Trait for signup and login
#[async_trait::async_trait]
pub trait AuthServiceTrait: Send + Sync {
    async fn signup(&self, username: &str, password: &str) -> Result<Credential, DomainError>;
    async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, DomainError>;
}

#[async_trait::async_trait]
impl<R, H, T> AuthServiceTrait for AuthService<R, H, T>
where
    R: CredentialRepository + 'static,
    H: PasswordHasher + 'static,
    T: TokenService + 'static,
{
    async fn signup(&self, username: &str, password: &str) -> Result<Credential, DomainError> {
        AuthService::signup(self, username, password).await
    }

    async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, DomainError> {
        AuthService::login(self, username, password).await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::Duration;

    use super::*;
    use crate::infrastructure::auth::{fast_hasher, AuthSettings, JwtConfig, JwtService};
    use crate::infrastructure::credential::InMemoryCredentialRepository;

    pub(crate) const TEST_SECRET: &str = "test-secret-that-is-at-least-32-bytes-long";

    /// In-memory state with cheap hashing
    pub(crate) fn test_state(password_min_length: usize, token_ttl: Duration) -> AppState {
        let store = Arc::new(InMemoryCredentialRepository::new());
        let tokens = Arc::new(JwtService::new(
            JwtConfig::new(TEST_SECRET, token_ttl).unwrap(),
        ));
        let auth_service = AuthService::new(
            Arc::clone(&store),
            Arc::new(fast_hasher()),
            Arc::clone(&tokens),
            AuthSettings {
                password_min_length,
            },
        )
        .unwrap();

        AppState {
            auth_service: Arc::new(auth_service),
            token_service: tokens,
            credential_store: store,
        }
    }
}
