//! Authentication API endpoints
//!
//! Signup and login are public; everything else in this router sits behind
//! the bearer token gate.

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};

use crate::api::middleware::{require_auth, Authenticated};
use crate::api::state::AppState;
use crate::api::types::{
    validate_body, ApiError, Json, LoginRequest, LoginResponse, MeResponse, SignupRequest,
    SignupResponse,
};

/// Create the authentication router
pub fn create_auth_router(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(get_current_subject))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .merge(protected)
}

/// Register a new credential
///
/// POST /auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    validate_body(&request)?;

    let credential = state
        .auth_service
        .signup(&request.username, &request.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse::from(credential.to_public())),
    ))
}

/// Exchange a username and password for a bearer token
///
/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let issued = state
        .auth_service
        .login(&request.username, &request.password)
        .await?;

    Ok(Json(LoginResponse::from(issued)))
}

/// GET /auth/me
pub async fn get_current_subject(Authenticated(subject): Authenticated) -> Json<MeResponse> {
    Json(MeResponse {
        subject: subject.subject,
        issued_at: subject.issued_at,
        expires_at: subject.expires_at,
    })
}
