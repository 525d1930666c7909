//! Asynchronous generation jobs and their per-connection bookkeeping.
//!
//! A job is handed off with [`dispatch_generation`], which spawns a task
//! and returns its `JoinHandle` immediately -- the WebSocket receive loop
//! never waits on the oracle. The spawned task owns the terminal-state
//! contract: exactly one of `generation_complete` / `generation_error`
//! goes to the originating connection, and the in-flight registration is
//! cleared on both paths.

use std::collections::HashSet;
use std::sync::Arc;

use arcana_core::reading::{self, ReadingRequest};
use arcana_oracle::Oracle;
use tokio::sync::Mutex;

use crate::ws::protocol::ServerEvent;
use crate::ws::WsManager;

/// User-facing message substituted for a failed reading.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Não foi possível gerar sua leitura. Por favor, tente novamente.";

/// User-facing message substituted for a failed chat reply.
pub const CHAT_FAILED_MESSAGE: &str =
    "Não consegui responder agora. Por favor, tente novamente.";

/// One asynchronous invocation of the reading generator plus its
/// delivery target. Exists only for the duration of the spawned task.
#[derive(Debug)]
pub struct GenerationJob {
    pub request: ReadingRequest,
    /// The only connection this job's result may be delivered to.
    pub conn_id: String,
}

/// Tracks which connections have a generation in flight.
///
/// A second `start_generation` while a job is running gets a
/// `generation_pending` answer instead of a second job.
pub struct JobRegistry {
    active: Mutex<HashSet<String>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self {
            active: Mutex::new(HashSet::new()),
        }
    }

    /// Claim the in-flight slot for a connection.
    ///
    /// Returns `false` if a job is already running for it.
    pub async fn try_begin(&self, conn_id: &str) -> bool {
        self.active.lock().await.insert(conn_id.to_string())
    }

    /// Release the in-flight slot (job finished or connection closed).
    pub async fn finish(&self, conn_id: &str) {
        self.active.lock().await.remove(conn_id);
    }

    /// Whether a job is currently in flight for the connection.
    pub async fn is_active(&self, conn_id: &str) -> bool {
        self.active.lock().await.contains(conn_id)
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn the generation task for a job and return its handle.
///
/// Returns without waiting on the oracle; completion is signaled by the
/// single terminal event the task sends to `job.conn_id`.
pub fn dispatch_generation(
    ws_manager: Arc<WsManager>,
    oracle: Arc<dyn Oracle>,
    jobs: Arc<JobRegistry>,
    job: GenerationJob,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let prompt = reading::build_reading_prompt(&job.request);
        tracing::debug!(conn_id = %job.conn_id, "Generation job dispatched");

        let event = match oracle.generate(&prompt).await {
            Ok(markdown) => ServerEvent::GenerationComplete {
                reading: reading::render_reading(&markdown),
            },
            Err(e) => {
                tracing::warn!(conn_id = %job.conn_id, error = %e, "Reading generation failed");
                ServerEvent::GenerationError {
                    message: GENERATION_FAILED_MESSAGE.to_string(),
                }
            }
        };

        jobs.finish(&job.conn_id).await;

        // The push channel outlives the originating request; if the client
        // disconnected in the meantime there is nobody left to tell.
        if !ws_manager.send_to(&job.conn_id, event.to_message()).await {
            tracing::debug!(conn_id = %job.conn_id, "Connection gone before delivery");
        }
    })
}

/// Spawn a follow-up chat reply task and return its handle.
///
/// Stateless: one oracle call with the prior reading as context, one
/// `receive_message` back to the same connection. Failures surface as a
/// readable chat message, never silence.
pub fn dispatch_chat(
    ws_manager: Arc<WsManager>,
    oracle: Arc<dyn Oracle>,
    conn_id: String,
    message: String,
    prior_reading: String,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let prompt = reading::build_chat_prompt(&message, &prior_reading);

        let reply = match oracle.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(conn_id = %conn_id, error = %e, "Chat reply failed");
                CHAT_FAILED_MESSAGE.to_string()
            }
        };

        let event = ServerEvent::ReceiveMessage { message: reply };
        if !ws_manager.send_to(&conn_id, event.to_message()).await {
            tracing::debug!(conn_id = %conn_id, "Connection gone before chat delivery");
        }
    })
}
