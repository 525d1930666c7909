//! WebSocket infrastructure for real-time delivery.
//!
//! Provides connection management, the event protocol, heartbeat
//! monitoring, and the HTTP upgrade handler used by Axum routes.

mod handler;
mod heartbeat;
pub mod manager;
pub mod protocol;

pub use handler::{handle_start_generation, ws_handler};
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
