//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, Argon2Config, AuthConfig, ConfigValidationError, DatabaseConfig, LogFormat,
    LoggingConfig, MetricsConfig, ServerConfig, StorageBackend, StorageConfig,
};
