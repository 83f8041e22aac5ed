/// Common test utilities for HTTP tests
///
/// Builds the full router over the in-memory repositories so the request
/// path (middleware, extractors, handlers, services) runs without a
/// database.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use taskhub_api::app::{build_router, AppState};
use taskhub_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use taskhub_shared::repository::memory::InMemoryStore;
use tower::Service as _;

pub const TEST_SECRET: &str = "api-test-secret-key-at-least-32-bytes";

/// Test context holding the router and its backing store
pub struct TestContext {
    pub app: axum::Router,
    pub store: InMemoryStore,
}

/// Response status plus parsed JSON body
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestContext {
    pub fn new() -> Self {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: "postgresql://unused".to_string(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: TEST_SECRET.to_string(),
            },
        };

        let store = InMemoryStore::new();
        let state = AppState::new(Arc::new(store.users()), Arc::new(store.tasks()), config);

        Self {
            app: build_router(state),
            store,
        }
    }

    /// Sends a request and decodes the JSON body (`Value::Null` when empty)
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send_request(request).await
    }

    /// Sends a prebuilt request
    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        TestResponse { status, body }
    }

    /// Registers a user and returns `(token, user_id)`
    pub async fn register(&self, username: &str) -> (String, String) {
        let response = self
            .send(
                "POST",
                "/api/v1/auth/register",
                None,
                Some(serde_json::json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": "password123",
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        (
            response.body["token"].as_str().unwrap().to_string(),
            response.body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    /// Creates a task and returns its JSON view
    pub async fn create_task(&self, token: &str, body: Value) -> Value {
        let response = self.send("POST", "/api/v1/tasks", Some(token), Some(body)).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body
    }
}
