use thiserror::Error;

/// Reasons a bearer token was not accepted
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("no bearer token supplied")]
    Missing,

    #[error("token has expired")]
    Expired,

    #[error("token signature is invalid")]
    BadSignature,

    #[error("token is malformed")]
    Malformed,
}

impl TokenError {
    /// Stable label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Expired => "expired",
            Self::BadSignature => "bad_signature",
            Self::Malformed => "malformed",
        }
    }
}

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Already exists: {message}")]
    AlreadyExists { message: String },

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Unauthenticated: {0}")]
    Unauthenticated(#[from] TokenError),

    #[error("Credential store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::AlreadyExists {
            message: message.into(),
        }
    }

    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
