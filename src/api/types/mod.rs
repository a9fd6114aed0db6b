//! HTTP request, response and error types

pub mod auth;
pub mod error;
pub mod json;

pub use auth::{
    validate_body, LoginRequest, LoginResponse, MeResponse, SignupRequest, SignupResponse,
};
pub use error::{ApiError, ApiErrorKind, ApiErrorResponse};
pub use json::Json;
