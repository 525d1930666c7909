//! The push-channel wire protocol.
//!
//! Events travel as a JSON envelope `{"event": ..., "data": ...}` in Text
//! frames, matching what the results page emits and listens for.

use arcana_core::reading::ChosenCard;
use axum::extract::ws::Message;
use serde::{Deserialize, Serialize};

/// Client → server events.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    StartGeneration(StartGenerationPayload),
    SendMessage(SendMessagePayload),
}

/// Payload of `start_generation`.
///
/// `intencao` and `selected_cards` are client-side echoes of the hidden
/// form fields; the stored session binding is authoritative and they are
/// ignored server-side.
#[derive(Debug, Deserialize)]
pub struct StartGenerationPayload {
    #[serde(default)]
    pub intencao: String,
    #[serde(default)]
    pub selected_cards: String,
    pub choosed_cards: Vec<ChosenCard>,
}

/// Payload of `send_message` (follow-up chat). Stateless: the prior
/// reading rides along as context for the single oracle call.
#[derive(Debug, Deserialize)]
pub struct SendMessagePayload {
    pub message: String,
    #[serde(default)]
    pub tarot_reading: String,
}

/// Server → client events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// The rendered reading, delivered exactly once per job.
    GenerationComplete { reading: String },
    /// Terminal failure for a job, delivered exactly once.
    GenerationError { message: String },
    /// A generation is already in flight for this connection.
    GenerationPending {},
    /// Follow-up chat reply.
    ReceiveMessage { message: String },
}

impl ServerEvent {
    /// Serialize into a WebSocket Text frame.
    pub fn to_message(&self) -> Message {
        // Serializing this enum cannot fail: all payloads are plain strings.
        let json = serde_json::to_string(self).expect("server event serialization");
        Message::Text(json.into())
    }
}
