//! Common test utilities for integration tests
//!
//! Every test gets its own router over a fresh `MemoryStore` holding one
//! user, plus a valid access token for that user. No database is needed.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tidytask_api::app::{build_router, AppState};
use tidytask_api::config::Config;
use tidytask_shared::auth::jwt::{create_token, Claims, TokenType};
use tidytask_shared::auth::{password, AuthContext};
use tidytask_shared::models::{CreateUser, User};
use tidytask_shared::store::{MemoryStore, Store};
use tower::Service as _;

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const PASSWORD: &str = "Sup3r$ecret";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_vars(&[]).await
    }

    /// Builds a context with extra configuration variables
    pub async fn with_vars(vars: &[(&str, &str)]) -> Self {
        let mut env: HashMap<String, String> = HashMap::from([
            ("DATABASE_URL".to_string(), "postgresql://localhost/unused".to_string()),
            ("JWT_SECRET".to_string(), JWT_SECRET.to_string()),
        ]);
        env.extend(vars.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        let config = Config::from_lookup(|key| env.get(key).cloned()).unwrap();

        let store = Arc::new(MemoryStore::new());
        let user = create_user(store.as_ref(), "alice").await;
        let jwt_token = token_for(&user);

        let state = AppState::new(store.clone(), config.clone()).unwrap();
        let app = build_router(state);

        Self {
            store,
            app,
            config,
            user,
            jwt_token,
        }
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Returns a `Cookie` header value carrying the session
    pub fn session_cookie(&self) -> String {
        format!("tidytask_session={}", self.jwt_token)
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().call(request).await.unwrap()
    }

    /// Sends a JSON request as the test user and decodes the JSON response
    pub async fn api(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.api_as(&self.auth_header(), method, uri, body).await
    }

    /// Sends a JSON request with the given `Authorization` value
    pub async fn api_as(
        &self,
        authorization: &str,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if !authorization.is_empty() {
            builder = builder.header(header::AUTHORIZATION, authorization);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.send(request).await;
        let status = response.status();
        (status, json_body(response).await)
    }

    /// Submits a url-encoded form with the session cookie
    pub async fn form(&self, uri: &str, body: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::COOKIE, self.session_cookie())
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Loads a page with the session cookie and any extra cookies
    pub async fn page(&self, uri: &str, extra_cookies: &str) -> Response<Body> {
        let mut cookie = self.session_cookie();
        if !extra_cookies.is_empty() {
            cookie.push_str("; ");
            cookie.push_str(extra_cookies);
        }

        self.send(
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }
}

/// Inserts an active user with password [`PASSWORD`]
pub async fn create_user(store: &dyn Store, username: &str) -> User {
    store
        .create_user(CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: password::hash_password(PASSWORD).unwrap(),
            first_name: Some("Test".to_string()),
            last_name: Some("User".to_string()),
            is_active: true,
        })
        .await
        .unwrap()
}

/// Mints an access token for `user`
pub fn token_for(user: &User) -> String {
    let claims = Claims::new(&AuthContext::from(user), TokenType::Access);
    create_token(&claims, JWT_SECRET).unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
}

pub async fn text_body(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// `Location` header of a redirect
pub fn location(response: &Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

/// Every `Set-Cookie` header of a response
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// The `name=value` pair of the cookie `name` set by a response
pub fn cookie_pair(response: &Response<Body>, name: &str) -> Option<String> {
    set_cookies(response)
        .into_iter()
        .find(|c| c.starts_with(&format!("{name}=")))
        .and_then(|c| c.split(';').next().map(str::to_string))
}
