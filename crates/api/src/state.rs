use std::sync::Arc;

use arcana_oracle::Oracle;

use crate::config::ServerConfig;
use crate::jobs::JobRegistry;
use crate::sessions::SessionStore;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Every service handle is constructed once at process start and injected
/// here; nothing reads ambient globals. Cheaply cloneable (inner data is
/// behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Session-token → stored-intent bindings.
    pub sessions: Arc<SessionStore>,
    /// WebSocket connection manager (per-connection delivery).
    pub ws_manager: Arc<WsManager>,
    /// Generation service client, behind the [`Oracle`] trait for mocking.
    pub oracle: Arc<dyn Oracle>,
    /// In-flight generation jobs, keyed by connection.
    pub jobs: Arc<JobRegistry>,
}
