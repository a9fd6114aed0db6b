//! PMP Auth Service
//!
//! Username/password signup and login issuing HS256 bearer tokens, with:
//! - Argon2id password hashing
//! - PostgreSQL or in-memory credential storage
//! - A bearer token gate for protected routes

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use config::StorageBackend;
use domain::CredentialRepository;
use infrastructure::{
    auth::{Argon2Hasher, AuthService, AuthSettings, JwtConfig, JwtService},
    credential::{InMemoryCredentialRepository, PostgresCredentialRepository},
};
use rand::Rng;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

/// Length of secrets produced by `generate-secret`
pub const GENERATED_SECRET_LENGTH: usize = 64;

/// Create the application state from validated configuration
///
/// Fails when the secret or hashing parameters are unusable or the database
/// cannot be reached.
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    config.validate()?;

    let secret = config
        .auth
        .jwt_secret
        .clone()
        .ok_or_else(|| anyhow::anyhow!("JWT secret is not configured"))?;
    let tokens = Arc::new(JwtService::new(JwtConfig::new(
        secret,
        config.auth.token_ttl(),
    )?));

    let argon2 = &config.auth.argon2;
    let hasher = Arc::new(Argon2Hasher::with_params(
        argon2.memory_kib,
        argon2.iterations,
        argon2.parallelism,
    )?);

    let settings = AuthSettings {
        password_min_length: config.auth.password_min_length,
    };

    match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory credential store; credentials are lost on restart");
            let store = Arc::new(InMemoryCredentialRepository::new());
            build_state(store, hasher, tokens, settings)
        }
        StorageBackend::Postgres => {
            let store = Arc::new(connect_postgres(config).await?);
            build_state(store, hasher, tokens, settings)
        }
    }
}

fn build_state<R>(
    store: Arc<R>,
    hasher: Arc<Argon2Hasher>,
    tokens: Arc<JwtService>,
    settings: AuthSettings,
) -> anyhow::Result<AppState>
where
    R: CredentialRepository + 'static,
{
    let auth_service = AuthService::new(Arc::clone(&store), hasher, Arc::clone(&tokens), settings)?;

    Ok(AppState {
        auth_service: Arc::new(auth_service),
        token_service: tokens,
        credential_store: store,
    })
}

async fn connect_postgres(config: &AppConfig) -> anyhow::Result<PostgresCredentialRepository> {
    let database = &config.database;
    let url = database
        .url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("database.url (or DATABASE_URL) is required"))?;

    let pool = PgPoolOptions::new()
        .max_connections(database.max_connections)
        .acquire_timeout(database.acquire_timeout())
        .connect(url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to PostgreSQL: {}", e))?;
    info!(
        max_connections = database.max_connections,
        "PostgreSQL connection established"
    );

    let store = PostgresCredentialRepository::new(pool, database.query_timeout());
    store
        .health_check()
        .await
        .map_err(|e| anyhow::anyhow!("Credential store is not usable: {}", e))?;

    Ok(store)
}

/// Random alphanumeric secret suitable for `JWT_SECRET`
pub fn generate_secret() -> String {
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_SECRET_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use crate::infrastructure::auth::TokenService;

    fn memory_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.storage.backend = StorageBackend::Memory;
        config.auth.jwt_secret = Some(generate_secret());
        config.auth.argon2.memory_kib = 1024;
        config.auth.argon2.iterations = 1;
        config.auth.argon2.parallelism = 1;
        config
    }

    #[test]
    fn test_generate_secret() {
        let secret = generate_secret();

        assert_eq!(secret.len(), GENERATED_SECRET_LENGTH);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(secret, generate_secret());
    }

    #[tokio::test]
    async fn test_memory_state_signup_login_verify() {
        let state = create_app_state_with_config(&memory_config()).await.unwrap();

        let created = state
            .auth_service
            .signup("alice", "Sup3rSecret!")
            .await
            .unwrap();
        assert_eq!(created.id().value(), 1);

        let issued = state.auth_service.login("alice", "Sup3rSecret!").await.unwrap();
        let claims = state.token_service.verify(&issued.token).unwrap();

        assert_eq!(claims.subject(), "alice");
        assert_eq!(state.credential_store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_secret_aborts_startup() {
        let mut config = memory_config();
        config.auth.jwt_secret = None;

        assert!(create_app_state_with_config(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_short_secret_aborts_startup() {
        let mut config = memory_config();
        config.auth.jwt_secret = Some("too-short".to_string());

        assert!(create_app_state_with_config(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_database_aborts_startup() {
        let mut config = memory_config();
        config.storage.backend = StorageBackend::Postgres;
        config.database.url = Some("postgres://auth@127.0.0.1:1/auth".to_string());
        config.database.acquire_timeout_secs = 1;

        assert!(create_app_state_with_config(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_login_failure_through_state() {
        let state = create_app_state_with_config(&memory_config()).await.unwrap();

        let err = state.auth_service.login("nobody", "whatever").await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidCredentials));
    }
}
