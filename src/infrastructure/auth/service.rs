//! Auth service orchestrating signup and login

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::credential::{
    validate_password, validate_username, Credential, CredentialRepository, NewCredential,
};
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_login, record_signup};

use super::jwt::{IssuedToken, TokenService};
use super::password::PasswordHasher;

const DEFAULT_PASSWORD_MIN_LENGTH: usize = 8;

/// Verified against when a username is unknown so both failures cost the same
const TIMING_DUMMY_PASSWORD: &str = "timing-equalization-dummy-password";

/// Policy knobs for the auth service
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub password_min_length: usize,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            password_min_length: DEFAULT_PASSWORD_MIN_LENGTH,
        }
    }
}

/// Auth service for signup and login
#[derive(Debug)]
pub struct AuthService<R: CredentialRepository, H: PasswordHasher, T: TokenService> {
    repository: Arc<R>,
    hasher: Arc<H>,
    tokens: Arc<T>,
    settings: AuthSettings,
    dummy_hash: String,
}

impl<R, H, T> AuthService<R, H, T>
where
    R: CredentialRepository,
    H: PasswordHasher + 'static,
    T: TokenService,
{
    /// Create a new auth service
    pub fn new(
        repository: Arc<R>,
        hasher: Arc<H>,
        tokens: Arc<T>,
        settings: AuthSettings,
    ) -> Result<Self, DomainError> {
        let dummy_hash = hasher.hash(TIMING_DUMMY_PASSWORD)?;

        Ok(Self {
            repository,
            hasher,
            tokens,
            settings,
            dummy_hash,
        })
    }

    /// Register a new credential
    pub async fn signup(&self, username: &str, password: &str) -> Result<Credential, DomainError> {
        let result = self.create_credential(username, password).await;

        match &result {
            Ok(credential) => {
                info!(
                    credential_id = %credential.id(),
                    username = %credential.username(),
                    "Credential created"
                );
                record_signup("created");
            }
            Err(e) => {
                debug!(username = %username, error = %e, "Signup rejected");
                record_signup(outcome_label(e));
            }
        }

        result
    }

    async fn create_credential(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Credential, DomainError> {
        validate_username(username).map_err(|e| DomainError::invalid_input(e.to_string()))?;

        validate_password(password, self.settings.password_min_length)
            .map_err(|e| DomainError::invalid_input(e.to_string()))?;

        let password_hash = self.hash_password(password).await?;

        // Uniqueness is decided by the store, not checked up front
        self.repository
            .create(NewCredential::new(username, password_hash))
            .await
    }

    /// Verify a username and password and issue a token
    ///
    /// Unknown usernames and wrong passwords fail identically.
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, DomainError> {
        let credential = match self.repository.find_by_username(username).await {
            Ok(credential) => credential,
            Err(e) => {
                record_login(outcome_label(&e));
                return Err(e);
            }
        };

        let hash = credential
            .as_ref()
            .map(|c| c.password_hash().to_string())
            .unwrap_or_else(|| self.dummy_hash.clone());

        let verified = self.verify_password(password, hash).await?;

        let credential = match credential {
            Some(credential) if verified => credential,
            Some(_) => {
                warn!(username = %username, reason = "password_mismatch", "Login failed");
                record_login("invalid_credentials");
                return Err(DomainError::InvalidCredentials);
            }
            None => {
                warn!(username = %username, reason = "unknown_username", "Login failed");
                record_login("invalid_credentials");
                return Err(DomainError::InvalidCredentials);
            }
        };

        let issued = self
            .tokens
            .issue(credential.username(), self.tokens.default_ttl())?;

        info!(
            credential_id = %credential.id(),
            username = %credential.username(),
            expires_at = %issued.expires_at,
            "Login succeeded"
        );
        record_login("success");

        Ok(issued)
    }

    async fn hash_password(&self, password: &str) -> Result<String, DomainError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::internal(format!("Password hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: &str, hash: String) -> Result<bool, DomainError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| DomainError::internal(format!("Password verification task failed: {}", e)))
    }
}

fn outcome_label(error: &DomainError) -> &'static str {
    match error {
        DomainError::InvalidInput { .. } => "invalid_input",
        DomainError::AlreadyExists { .. } => "already_exists",
        DomainError::InvalidCredentials => "invalid_credentials",
        DomainError::StoreUnavailable { .. } => "store_unavailable",
        _ => "error",
    }
}
