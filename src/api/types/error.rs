//! API error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

const UNAUTHENTICATED_MESSAGE: &str = "Missing or invalid bearer token";
const INTERNAL_MESSAGE: &str = "Internal server error";

/// Error kinds exposed to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiErrorKind {
    InvalidInput,
    AlreadyExists,
    InvalidCredentials,
    Unauthenticated,
    StoreUnavailable,
    Internal,
}

impl std::fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::InvalidInput => "InvalidInput",
            Self::AlreadyExists => "AlreadyExists",
            Self::InvalidCredentials => "InvalidCredentials",
            Self::Unauthenticated => "Unauthenticated",
            Self::StoreUnavailable => "StoreUnavailable",
            Self::Internal => "Internal",
        };
        f.write_str(name)
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorKind,
    pub message: String,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: kind,
                message: message.into(),
            },
        }
    }

    pub fn kind(&self) -> ApiErrorKind {
        self.response.error
    }

    /// Malformed or policy-violating input
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorKind::InvalidInput, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, ApiErrorKind::AlreadyExists, message)
    }

    /// Login failure; identical for unknown users and wrong passwords
    pub fn invalid_credentials() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ApiErrorKind::InvalidCredentials,
            "Invalid username or password",
        )
    }

    /// Gate rejection; never reveals why the token was refused
    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ApiErrorKind::Unauthenticated,
            UNAUTHENTICATED_MESSAGE,
        )
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorKind::StoreUnavailable,
            message,
        )
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiErrorKind::Internal,
            INTERNAL_MESSAGE,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidInput { message } => Self::bad_request(message),
            DomainError::AlreadyExists { message } => Self::conflict(message),
            DomainError::InvalidCredentials => Self::invalid_credentials(),
            DomainError::Unauthenticated(_) => Self::unauthorized(),
            DomainError::StoreUnavailable { message } => {
                tracing::error!(error = %message, "Credential store unavailable");
                Self::unavailable("Credential store is temporarily unavailable")
            }
            DomainError::Configuration { message } | DomainError::Internal { message } => {
                tracing::error!(error = %message, "Internal error");
                Self::internal()
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.response.error, self.response.message)
    }
}

impl std::error::Error for ApiError {}
