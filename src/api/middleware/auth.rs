//! Bearer token gate for protected routes

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::{DomainError, TokenError};
use crate::infrastructure::auth::{JwtClaims, TokenService};
use crate::infrastructure::observability::record_gate_rejection;

/// Identity established by the gate, stored in request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSubject {
    pub subject: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<JwtClaims> for AuthenticatedSubject {
    fn from(claims: JwtClaims) -> Self {
        Self {
            subject: claims.subject().to_string(),
            issued_at: claims.issued_at(),
            expires_at: claims.expires_at(),
        }
    }
}

/// Middleware that rejects requests without a valid bearer token
///
/// Layer it on a router with `middleware::from_fn_with_state`. The store is
/// never consulted; a valid signature and expiry are sufficient.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let subject = authenticate(state.token_service.as_ref(), request.headers())?;

    debug!(subject = %subject.subject, "Request authenticated");

    request.extensions_mut().insert(subject);
    Ok(next.run(request).await)
}

fn authenticate(
    tokens: &dyn TokenService,
    headers: &HeaderMap,
) -> Result<AuthenticatedSubject, ApiError> {
    let verified = extract_bearer_token(headers).and_then(|token| tokens.verify(token));

    match verified {
        Ok(claims) => Ok(claims.into()),
        Err(reason) => {
            warn!(reason = reason.as_str(), "Request rejected by auth gate");
            record_gate_rejection(reason.as_str());
            Err(DomainError::from(reason).into())
        }
    }
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, TokenError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(TokenError::Missing)?
        .to_str()
        .map_err(|_| TokenError::Missing)?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or(TokenError::Missing)?
        .trim();

    if token.is_empty() {
        return Err(TokenError::Missing);
    }

    Ok(token)
}

/// Extractor for handlers behind `require_auth`
///
/// Rejects with 401 when the gate did not run.
#[derive(Debug, Clone)]
pub struct Authenticated(pub AuthenticatedSubject);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthenticatedSubject>() {
            Some(subject) => Ok(Authenticated(subject.clone())),
            None => {
                warn!(path = %parts.uri.path(), "Authenticated extractor used without auth gate");
                Err(ApiError::unauthorized())
            }
        }
    }
}
