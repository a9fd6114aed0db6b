use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

use super::auth;
use super::health;
use super::middleware::{logging_middleware, metrics_middleware, security_headers_middleware};
use super::state::AppState;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState, metrics: Option<PrometheusMetrics>) -> Router {
    let mut router = Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Signup/login are public, the rest of /auth is gated
        .nest("/auth", auth::create_auth_router(&state))
        .with_state(state);

    if let Some(m) = metrics {
        router = router.merge(create_metrics_router(m));
    }

    router
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::api::state::test_support::test_state;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct TestClient {
        app: Router,
    }

    impl TestClient {
        fn new(password_min_length: usize, ttl: Duration) -> Self {
            Self {
                app: create_router_with_state(test_state(password_min_length, ttl), None),
            }
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = self.app.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

            (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
        }

        async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
            self.send(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
        }

        async fn me(&self, token: &str) -> (StatusCode, Value) {
            self.send(
                Request::builder()
                    .uri("/auth/me")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
        }
    }

    #[tokio::test]
    async fn test_health_and_live() {
        let client = TestClient::new(8, Duration::from_secs(60));

        for uri in ["/health", "/live", "/ready"] {
            let (status, _) = client
                .send(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await;
            assert_eq!(status, StatusCode::OK, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_security_headers_on_errors() {
        let client = TestClient::new(8, Duration::from_secs(60));

        let response = client
            .app
            .clone()
            .oneshot(Request::builder().uri("/auth/me").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    }

    #[tokio::test]
    async fn test_tampered_token_rejected() {
        let client = TestClient::new(8, Duration::from_secs(60));
        let credentials = json!({"username": "bob", "password": "Sup3rSecret!"});

        client.post("/auth/signup", credentials.clone()).await;
        let (_, body) = client.post("/auth/login", credentials).await;
        let token = body["token"].as_str().unwrap().to_string();

        let (header_and_payload, signature) = token.rsplit_once('.').unwrap();
        let flipped = if signature.starts_with('A') { 'B' } else { 'A' };
        let tampered = format!("{}.{}{}", header_and_payload, flipped, &signature[1..]);

        let (status, body) = client.me(&tampered).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthenticated");
    }

    #[tokio::test]
    async fn test_signup_login_access_until_expiry() {
        let client = TestClient::new(4, Duration::from_secs(1));

        let (status, body) = client
            .post(
                "/auth/signup",
                json!({"username": "alice", "password": "Sup3rSecret!"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({"id": 1, "username": "alice"}));

        let (status, body) = client
            .post("/auth/signup", json!({"username": "alice", "password": "other"}))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "AlreadyExists");

        let (status, body) = client
            .post(
                "/auth/login",
                json!({"username": "alice", "password": "Sup3rSecret!"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap().to_string();

        let (status, body) = client.me(&token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["subject"], "alice");

        tokio::time::sleep(Duration::from_millis(1100)).await;

        let (status, body) = client.me(&token).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthenticated");
    }
}
