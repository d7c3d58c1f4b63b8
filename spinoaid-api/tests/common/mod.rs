/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - An in-memory store with indexes in place
/// - A registered test user and bearer token
/// - Request helpers that decode JSON responses

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use spinoaid_api::app::{build_router, AppState};
use spinoaid_api::config::Config;
use spinoaid_shared::auth::jwt::TokenIssuer;
use spinoaid_shared::auth::password::hash_password;
use spinoaid_shared::models::{
    self,
    user::{CreateUser, User},
};
use spinoaid_shared::store::{DocumentStore, MemoryStore};
use std::sync::Arc;
use tower::Service as _;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a context with default settings
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_vars(&[]).await
    }

    /// Creates a context with extra configuration variables
    pub async fn with_vars(vars: &[(&str, &str)]) -> anyhow::Result<Self> {
        let config = Config::from_vars(|key| {
            if key == "JWT_SECRET" {
                return Some(TEST_SECRET.to_string());
            }
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })?;

        let store = Arc::new(MemoryStore::new());
        models::ensure_indexes(&*store).await?;

        let user = User::create(
            &*store,
            CreateUser {
                name: "Test User".to_string(),
                email: "test-user@example.com".to_string(),
                password_hash: hash_password(TEST_PASSWORD)?,
            },
        )
        .await?;

        let jwt_token = TokenIssuer::new(TEST_SECRET).issue(user.id)?;

        let shared: Arc<dyn DocumentStore> = store.clone();
        let state = AppState::new(shared, config.clone());
        let app = build_router(state);

        Ok(TestContext {
            store,
            app,
            config,
            user,
            jwt_token,
        })
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Issues a token for another subject
    pub fn token_for(&self, user_id: uuid::Uuid) -> String {
        TokenIssuer::new(TEST_SECRET)
            .issue(user_id)
            .expect("token issue")
    }

    /// Sends a request and decodes the JSON body (Null when empty or not JSON)
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    /// Sends a JSON request with the test user's token
    pub async fn send_json(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let token = self.auth_header();
        self.send(json_request(method, uri, Some(&token), body)).await
    }

    /// Sends a bodiless request with the test user's token
    pub async fn send_empty(&self, method: &str, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", self.auth_header())
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }
}

/// Builds a JSON request, optionally with an Authorization header
pub fn json_request(method: &str, uri: &str, auth: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");

    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

/// Builds a single-file multipart upload
pub fn multipart_request(uri: &str, filename: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let boundary = "spinoaid-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}
