use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::credential::MAX_PASSWORD_LENGTH;

/// Minimum signing secret length in bytes
const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Token and password policy
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret; falls back to `JWT_SECRET`
    pub jwt_secret: Option<String>,
    pub token_ttl_secs: u64,
    pub password_min_length: usize,
    pub argon2: Argon2Config,
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Argon2Config {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL; falls back to `DATABASE_URL`
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub query_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub path: String,
}

/// Configuration problems that abort startup
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigValidationError {
    #[error("auth.jwt_secret (or JWT_SECRET) must be set")]
    MissingJwtSecret,

    #[error("auth.jwt_secret must be at least {min} bytes, got {actual}")]
    JwtSecretTooShort { min: usize, actual: usize },

    #[error("auth.token_ttl_secs must be greater than zero")]
    InvalidTokenTtl,

    #[error("auth.password_min_length must be between 1 and {0}")]
    InvalidPasswordMinLength(usize),

    #[error("auth.argon2 parameters are invalid: {0}")]
    InvalidArgon2Params(String),

    #[error("database.url (or DATABASE_URL) must be set when storage.backend is postgres")]
    MissingDatabaseUrl,

    #[error("database.query_timeout_ms and database.acquire_timeout_secs must be greater than zero")]
    InvalidDatabaseTimeout,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_secs: 24 * 60 * 60,
            password_min_length: 8,
            argon2: Argon2Config::default(),
        }
    }
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            acquire_timeout_secs: 5,
            query_timeout_ms: 5000,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[hidden]"))
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("password_min_length", &self.password_min_length)
            .field("argon2", &self.argon2)
            .finish()
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_ref().map(|_| "[hidden]"))
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("query_timeout_ms", &self.query_timeout_ms)
            .finish()
    }
}

impl AuthConfig {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

impl AppConfig {
    /// Load configuration from files and `APP__*` environment variables
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Self = config.try_deserialize()?;
        config.apply_env_fallbacks(|key| std::env::var(key).ok());

        Ok(config)
    }

    /// Fill the secret and database URL from their conventional variables
    fn apply_env_fallbacks(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.auth.jwt_secret.is_none() {
            self.auth.jwt_secret = lookup("JWT_SECRET").filter(|s| !s.is_empty());
        }

        if self.database.url.is_none() {
            self.database.url = lookup("DATABASE_URL").filter(|s| !s.is_empty());
        }
    }

    /// Check everything startup depends on
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let secret = self
            .auth
            .jwt_secret
            .as_deref()
            .ok_or(ConfigValidationError::MissingJwtSecret)?;

        if secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigValidationError::JwtSecretTooShort {
                min: MIN_JWT_SECRET_LENGTH,
                actual: secret.len(),
            });
        }

        if self.auth.token_ttl_secs == 0 {
            return Err(ConfigValidationError::InvalidTokenTtl);
        }

        if self.auth.password_min_length == 0 || self.auth.password_min_length > MAX_PASSWORD_LENGTH
        {
            return Err(ConfigValidationError::InvalidPasswordMinLength(
                MAX_PASSWORD_LENGTH,
            ));
        }

        let argon2 = &self.auth.argon2;
        argon2::Params::new(argon2.memory_kib, argon2.iterations, argon2.parallelism, None)
            .map_err(|e| ConfigValidationError::InvalidArgon2Params(e.to_string()))?;

        if self.storage.backend == StorageBackend::Postgres {
            if self.database.url.is_none() {
                return Err(ConfigValidationError::MissingDatabaseUrl);
            }

            if self.database.query_timeout_ms == 0 || self.database.acquire_timeout_secs == 0 {
                return Err(ConfigValidationError::InvalidDatabaseTimeout);
            }
        }

        Ok(())
    }

    /// Human-readable summary with secrets redacted
    pub fn redacted_summary(&self) -> String {
        let secret = match &self.auth.jwt_secret {
            Some(s) => format!("[hidden, {} bytes]", s.len()),
            None => "[missing]".to_string(),
        };
        let database = match (&self.storage.backend, &self.database.url) {
            (StorageBackend::Memory, _) => "n/a (memory backend)".to_string(),
            (StorageBackend::Postgres, Some(_)) => "[hidden]".to_string(),
            (StorageBackend::Postgres, None) => "[missing]".to_string(),
        };

        [
            format!("server:          {}:{}", self.server.host, self.server.port),
            format!("logging:         {} ({:?})", self.logging.level, self.logging.format),
            format!("storage:         {:?}", self.storage.backend),
            format!("database.url:    {}", database),
            format!("jwt_secret:      {}", secret),
            format!("token_ttl_secs:  {}", self.auth.token_ttl_secs),
            format!("password_min:    {}", self.auth.password_min_length),
            format!(
                "argon2:          m={}KiB t={} p={}",
                self.auth.argon2.memory_kib,
                self.auth.argon2.iterations,
                self.auth.argon2.parallelism
            ),
            format!(
                "metrics:         {}",
                if self.metrics.enabled {
                    self.metrics.path.as_str()
                } else {
                    "disabled"
                }
            ),
        ]
        .join("\n")
    }
}
