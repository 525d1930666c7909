//! Session-token issuance and the shared intent store.
//!
//! A session token is an opaque UUID carried in a cookie; it correlates the
//! intake form, the card-draw page, and the WebSocket connection. Bindings
//! live in memory with an inactivity TTL and are consumed with an atomic
//! take-and-clear when generation begins, so a token can never produce two
//! readings.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use arcana_core::intent::StoredIntent;
use axum::http::HeaderMap;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Cookie that carries the session token.
pub const SESSION_COOKIE: &str = "arcana_session";

/// Opaque identifier correlating a client with its stored intent.
pub type SessionToken = String;

struct Entry {
    intent: StoredIntent,
    expires_at: Instant,
}

/// Shared store of session-token → intent bindings.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across all connections.
pub struct SessionStore {
    ttl: Duration,
    entries: RwLock<HashMap<SessionToken, Entry>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Issue a fresh opaque session token.
    pub fn issue_token(&self) -> SessionToken {
        uuid::Uuid::new_v4().to_string()
    }

    /// Store (or replace) the binding for a token, resetting its TTL.
    pub async fn insert(&self, token: SessionToken, intent: StoredIntent) {
        let entry = Entry {
            intent,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.write().await.insert(token, entry);
    }

    /// Read the binding without consuming it.
    ///
    /// Expired entries are treated as absent (the sweeper reclaims them).
    pub async fn peek(&self, token: &str) -> Option<StoredIntent> {
        let entries = self.entries.read().await;
        let entry = entries.get(token)?;
        if entry.expires_at <= Instant::now() {
            return None;
        }
        Some(entry.intent.clone())
    }

    /// Atomically take the binding, removing it from the store.
    ///
    /// The read and delete happen under one write lock, so of two
    /// concurrent takes on the same token exactly one observes the intent.
    pub async fn take(&self, token: &str) -> Option<StoredIntent> {
        let entry = self.entries.write().await.remove(token)?;
        if entry.expires_at <= Instant::now() {
            return None;
        }
        Some(entry.intent)
    }

    /// Drop all expired bindings. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// Current number of live bindings (expired-but-unswept included).
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Spawn the background task that periodically purges expired bindings.
///
/// Runs until `cancel` fires; the returned handle lets shutdown await it.
pub fn start_sweeper(
    store: std::sync::Arc<SessionStore>,
    interval: Duration,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::debug!("Session sweeper stopping");
                    break;
                }
                _ = ticker.tick() => {
                    let purged = store.purge_expired().await;
                    if purged > 0 {
                        tracing::debug!(purged, "Purged expired session bindings");
                    }
                }
            }
        }
    })
}

// ---------------------------------------------------------------------------
// Cookie plumbing
// ---------------------------------------------------------------------------

/// Extract the session token from a request's `Cookie` header, if present.
pub fn token_from_headers(headers: &HeaderMap) -> Option<SessionToken> {
    let raw = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    raw.split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

/// Build the `Set-Cookie` value for a session token.
pub fn session_cookie(token: &str, ttl_secs: u64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_secs}")
}
