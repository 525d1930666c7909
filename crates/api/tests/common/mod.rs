use std::sync::Arc;
use std::time::Duration;

use arcana_api::config::ServerConfig;
use arcana_api::jobs::JobRegistry;
use arcana_api::router::build_app_router;
use arcana_api::sessions::SessionStore;
use arcana_api::state::AppState;
use arcana_api::ws::WsManager;
use arcana_oracle::{Oracle, OracleError};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tokio::sync::Mutex;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Mock oracle
// ---------------------------------------------------------------------------

/// What the mock does when asked to generate.
pub enum MockBehavior {
    /// Answer immediately with this markdown.
    Reply(String),
    /// Fail with an API error.
    Fail,
    /// Sleep, then answer -- for verifying dispatch never blocks.
    Slow(Duration, String),
}

/// Test double for the generation service. Records every prompt it sees.
pub struct MockOracle {
    behavior: MockBehavior,
    prompts: Mutex<Vec<String>>,
}

impl MockOracle {
    pub fn replying(markdown: &str) -> Arc<Self> {
        Arc::new(Self {
            behavior: MockBehavior::Reply(markdown.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            behavior: MockBehavior::Fail,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn slow(delay: Duration, markdown: &str) -> Arc<Self> {
        Arc::new(Self {
            behavior: MockBehavior::Slow(delay, markdown.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// All prompts this mock has been called with, in order.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

#[async_trait]
impl Oracle for MockOracle {
    async fn generate(&self, prompt: &str) -> Result<String, OracleError> {
        self.prompts.lock().await.push(prompt.to_string());
        match &self.behavior {
            MockBehavior::Reply(markdown) => Ok(markdown.clone()),
            MockBehavior::Fail => Err(OracleError::Api {
                status: 500,
                message: "mock failure".to_string(),
            }),
            MockBehavior::Slow(delay, markdown) => {
                tokio::time::sleep(*delay).await;
                Ok(markdown.clone())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        session_ttl_secs: 1800,
        session_sweep_interval_secs: 60,
    }
}

/// Build the shared application state around a (mock) oracle.
pub fn build_test_state(oracle: Arc<dyn Oracle>) -> AppState {
    let config = test_config();
    let sessions = Arc::new(SessionStore::new(Duration::from_secs(
        config.session_ttl_secs,
    )));
    AppState {
        config: Arc::new(config),
        sessions,
        ws_manager: Arc::new(WsManager::new()),
        oracle,
        jobs: Arc::new(JobRegistry::new()),
    }
}

/// Build the full application router with all middleware layers.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app(state: AppState) -> Router {
    let config = (*state.config).clone();
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request"),
    )
    .await
    .expect("response")
}

pub async fn get_with_cookie(app: Router, uri: &str, cookie: &str) -> Response {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .header(COOKIE, cookie)
            .body(Body::empty())
            .expect("request"),
    )
    .await
    .expect("response")
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
    )
    .await
    .expect("response")
}

pub async fn post_json_with_cookie(
    app: Router,
    uri: &str,
    cookie: &str,
    body: serde_json::Value,
) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .header(COOKIE, cookie)
            .body(Body::from(body.to_string()))
            .expect("request"),
    )
    .await
    .expect("response")
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// Extract the `name=value` pair of the session cookie from a response.
pub fn session_cookie_pair(response: &Response) -> String {
    let raw = response
        .headers()
        .get(SET_COOKIE)
        .expect("response should set a session cookie")
        .to_str()
        .expect("cookie is ASCII");
    raw.split(';').next().expect("cookie pair").to_string()
}
