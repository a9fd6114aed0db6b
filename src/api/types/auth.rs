//! Request and response bodies for the auth endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::domain::PublicCredential;
use crate::infrastructure::auth::IssuedToken;

use super::error::ApiError;

/// Signup request
#[derive(Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 64, message = "Username must be 1 to 64 characters"))]
    pub username: String,
    #[validate(length(min = 1, max = 128, message = "Password must be 1 to 128 characters"))]
    pub password: String,
}

/// Login request; shape is not validated
#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupRequest")
            .field("username", &self.username)
            .field("password", &"[hidden]")
            .finish()
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[hidden]")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupResponse {
    pub id: i64,
    pub username: String,
}

impl From<PublicCredential> for SignupResponse {
    fn from(credential: PublicCredential) -> Self {
        Self {
            id: credential.id.value(),
            username: credential.username,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

impl From<IssuedToken> for LoginResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            token_type: "Bearer".to_string(),
            expires_at: issued.expires_at,
        }
    }
}

/// Identity of the caller as proven by its token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub subject: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Validate a request body, reporting the first failure as `InvalidInput`
pub fn validate_body<T: Validate>(body: &T) -> Result<(), ApiError> {
    body.validate()
        .map_err(|errors| ApiError::bad_request(first_validation_message(&errors)))
}

fn first_validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| errs.iter().map(move |e| (field.clone(), e)))
        .map(|(field, e)| match &e.message {
            Some(message) => message.to_string(),
            None => format!("Invalid value for '{}'", field),
        })
        .next()
        .unwrap_or_else(|| "Invalid request".to_string())
}
