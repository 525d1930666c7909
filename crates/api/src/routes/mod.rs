pub mod health;
pub mod reading;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the application route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health              health check
///
/// /process_form        intention intake (POST)
/// /cartas              card-draw page data (GET), chosen-card ack (POST)
/// /results             results shell (POST)
///
/// /ws                  WebSocket upgrade (push channel)
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(reading::router())
        .route("/ws", get(ws::ws_handler))
}
