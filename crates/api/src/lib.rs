//! Arcana API server library.
//!
//! Exposes the building blocks (config, state, error handling, sessions,
//! job dispatch, routes, WebSocket infrastructure) so integration tests
//! and the binary entrypoint can both access them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod router;
pub mod routes;
pub mod sessions;
pub mod state;
pub mod ws;
