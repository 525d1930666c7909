//! Client for the external text-generation service.
//!
//! [`OracleClient`] talks to an OpenAI-compatible chat-completions
//! endpoint. The [`Oracle`] trait is the seam the rest of the workspace
//! depends on, so generation can be mocked in tests without touching the
//! network.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 90;

/// Errors from the generation service.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// Transport-level failure (connect, timeout, TLS, ...).
    #[error("Oracle request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Oracle API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The service answered 2xx but the body had no usable completion.
    #[error("Malformed oracle response: {0}")]
    MalformedResponse(String),
}

/// The generation seam: one prompt in, one completion out.
///
/// No retries and no streaming; a failure is terminal for the caller's
/// job.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, OracleError>;
}

/// Oracle connection settings, loaded from the environment.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Bearer token for the API.
    pub api_key: String,
    /// Base URL of the chat-completions API (default: OpenAI).
    pub base_url: String,
    /// Model identifier (default: `gpt-4o-mini`).
    pub model: String,
    /// Request timeout in seconds (default: `90`). This is the only
    /// time bound on a generation job.
    pub timeout_secs: u64,
}

impl OracleConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var               | Default                     |
    /// |-----------------------|-----------------------------|
    /// | `ORACLE_API_KEY`      | (required)                  |
    /// | `ORACLE_BASE_URL`     | `https://api.openai.com/v1` |
    /// | `ORACLE_MODEL`        | `gpt-4o-mini`               |
    /// | `ORACLE_TIMEOUT_SECS` | `90`                        |
    pub fn from_env() -> Self {
        let api_key = std::env::var("ORACLE_API_KEY").expect("ORACLE_API_KEY must be set");

        let base_url =
            std::env::var("ORACLE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        let model = std::env::var("ORACLE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        let timeout_secs: u64 = std::env::var("ORACLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("ORACLE_TIMEOUT_SECS must be a valid u64");

        Self {
            api_key,
            base_url,
            model,
            timeout_secs,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Pull the first completion out of a response body.
fn extract_completion(response: ChatResponse) -> Result<String, OracleError> {
    let content = response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| OracleError::MalformedResponse("empty choices array".to_string()))?;

    if content.trim().is_empty() {
        return Err(OracleError::MalformedResponse(
            "completion content is empty".to_string(),
        ));
    }
    Ok(content)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Live client for the chat-completions endpoint.
pub struct OracleClient {
    http: reqwest::Client,
    config: OracleConfig,
}

impl OracleClient {
    /// Build a client from configuration.
    ///
    /// Panics if the underlying reqwest client cannot be constructed,
    /// which only happens on system TLS misconfiguration -- fail fast at
    /// startup rather than on the first reading.
    pub fn new(config: OracleConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");
        Self { http, config }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Oracle for OracleClient {
    async fn generate(&self, prompt: &str) -> Result<String, OracleError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Oracle API returned an error");
            return Err(OracleError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;

        extract_completion(body)
    }
}
