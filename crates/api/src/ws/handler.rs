use std::sync::Arc;

use arcana_core::reading::ReadingRequest;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};

use crate::jobs::{self, GenerationJob};
use crate::sessions::{self, SessionToken};
use crate::state::AppState;
use crate::ws::protocol::{ClientEvent, ServerEvent, StartGenerationPayload};

/// User-facing message when the session binding is gone.
const SESSION_EXPIRED_MESSAGE: &str = "Sua sessão expirou. Por favor, recomece sua consulta.";

/// User-facing message when the chosen cards don't match the session.
const INVALID_CARDS_MESSAGE: &str = "As cartas enviadas não correspondem à sua consulta.";

/// HTTP handler that upgrades the connection to WebSocket.
///
/// The upgrade request's session cookie binds the connection to its
/// session token; without it the connection can still chat but cannot
/// start a generation.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let session_token = sessions::token_from_headers(&headers);
    ws.on_upgrade(move |socket| handle_socket(socket, state, session_token))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager` under a fresh UUID.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Dispatches inbound events on the current task.
///   4. Cleans up (connection, in-flight slot) on disconnect.
async fn handle_socket(socket: WebSocket, state: AppState, session_token: Option<SessionToken>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, has_session = session_token.is_some(), "WebSocket connected");

    // Register and get the receiver for outbound messages.
    let mut rx = state.ws_manager.add(conn_id.clone(), session_token).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Receiver loop: each event name is dispatched from exactly one arm.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(ClientEvent::StartGeneration(payload)) => {
                    handle_start_generation(&state, &conn_id, payload).await;
                }
                Ok(ClientEvent::SendMessage(payload)) => {
                    // Chat runs off-loop too; one slow reply must not stall
                    // the connection's other events.
                    let _handle = jobs::dispatch_chat(
                        Arc::clone(&state.ws_manager),
                        Arc::clone(&state.oracle),
                        conn_id.clone(),
                        payload.message,
                        payload.tarot_reading,
                    );
                }
                Err(e) => {
                    tracing::debug!(conn_id = %conn_id, error = %e, "Unparseable client event");
                }
            },
            Ok(_msg) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up: remove connection, release any in-flight slot, stop sender.
    state.ws_manager.remove(&conn_id).await;
    state.jobs.finish(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

/// Resolve the session binding and hand the job to a worker task.
///
/// Emits exactly one event on every path that does not dispatch a job:
/// `generation_pending` for duplicates, `generation_error` for missing
/// sessions or invalid cards. Dispatched jobs emit their own single
/// terminal event.
pub async fn handle_start_generation(
    state: &AppState,
    conn_id: &str,
    payload: StartGenerationPayload,
) {
    if !state.jobs.try_begin(conn_id).await {
        send_event(state, conn_id, ServerEvent::GenerationPending {}).await;
        return;
    }

    let Some(token) = state.ws_manager.session_for(conn_id).await else {
        state.jobs.finish(conn_id).await;
        send_error(state, conn_id, SESSION_EXPIRED_MESSAGE).await;
        return;
    };

    // Atomic take-and-clear: the binding is single use, and of two racing
    // starts on the same token only one can observe it.
    let Some(intent) = state.sessions.take(&token).await else {
        state.jobs.finish(conn_id).await;
        send_error(state, conn_id, SESSION_EXPIRED_MESSAGE).await;
        return;
    };

    let request = match ReadingRequest::new(intent.clone(), payload.choosed_cards) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(conn_id = %conn_id, error = %e, "Rejected start_generation");
            // No generation ran; restore the binding so a corrected
            // resubmission can still use it.
            state.sessions.insert(token, intent).await;
            state.jobs.finish(conn_id).await;
            send_error(state, conn_id, INVALID_CARDS_MESSAGE).await;
            return;
        }
    };

    let _handle = jobs::dispatch_generation(
        Arc::clone(&state.ws_manager),
        Arc::clone(&state.oracle),
        Arc::clone(&state.jobs),
        GenerationJob {
            request,
            conn_id: conn_id.to_string(),
        },
    );
}

async fn send_event(state: &AppState, conn_id: &str, event: ServerEvent) {
    if !state.ws_manager.send_to(conn_id, event.to_message()).await {
        tracing::debug!(conn_id = %conn_id, "Failed to deliver event");
    }
}

async fn send_error(state: &AppState, conn_id: &str, message: &str) {
    send_event(
        state,
        conn_id,
        ServerEvent::GenerationError {
            message: message.to_string(),
        },
    )
    .await;
}
