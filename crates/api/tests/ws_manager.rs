//! Unit tests for `WsManager`.
//!
//! These tests exercise the WebSocket connection manager directly, without
//! performing any HTTP upgrades. They verify add/remove semantics,
//! per-connection addressing, and graceful shutdown behaviour.

use axum::extract::ws::Message;
use arcana_api::ws::WsManager;

// ---------------------------------------------------------------------------
// Test: new manager starts with zero connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_manager_has_zero_connections() {
    let manager = WsManager::new();

    assert_eq!(manager.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: add() and remove() track the connection count
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_and_remove_track_connection_count() {
    let manager = WsManager::new();

    let _rx = manager.add("conn-1".to_string(), None).await;
    assert_eq!(manager.connection_count().await, 1);

    manager.remove("conn-1").await;
    assert_eq!(manager.connection_count().await, 0);
}

#[tokio::test]
async fn remove_unknown_id_is_noop() {
    let manager = WsManager::new();

    let _rx = manager.add("conn-1".to_string(), None).await;
    manager.remove("nonexistent").await;

    assert_eq!(manager.connection_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: send_to delivers to exactly the addressed connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_to_reaches_only_the_addressed_connection() {
    let manager = WsManager::new();

    let mut rx1 = manager.add("conn-1".to_string(), None).await;
    let mut rx2 = manager.add("conn-2".to_string(), None).await;

    let delivered = manager
        .send_to("conn-1", Message::Text("hello".into()))
        .await;
    assert!(delivered);

    let received = rx1.recv().await.expect("conn-1 should receive");
    assert!(
        matches!(&received, Message::Text(t) if *t == "hello"),
        "Expected Text(\"hello\"), got: {received:?}"
    );

    // conn-2 must observe nothing.
    assert!(rx2.try_recv().is_err());
}

#[tokio::test]
async fn send_to_unknown_connection_returns_false() {
    let manager = WsManager::new();

    let delivered = manager
        .send_to("ghost", Message::Text("hello".into()))
        .await;
    assert!(!delivered);
}

#[tokio::test]
async fn send_to_dropped_receiver_returns_false() {
    let manager = WsManager::new();

    let rx = manager.add("conn-1".to_string(), None).await;
    drop(rx);

    let delivered = manager
        .send_to("conn-1", Message::Text("hello".into()))
        .await;
    assert!(!delivered);
}

// ---------------------------------------------------------------------------
// Test: session_for returns the token presented at registration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn session_for_returns_bound_token() {
    let manager = WsManager::new();

    let _rx1 = manager
        .add("conn-1".to_string(), Some("token-abc".to_string()))
        .await;
    let _rx2 = manager.add("conn-2".to_string(), None).await;

    assert_eq!(
        manager.session_for("conn-1").await,
        Some("token-abc".to_string())
    );
    assert_eq!(manager.session_for("conn-2").await, None);
    assert_eq!(manager.session_for("ghost").await, None);
}

// ---------------------------------------------------------------------------
// Test: shutdown_all() sends Close and clears all connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();

    let mut rx1 = manager.add("conn-1".to_string(), None).await;
    let mut rx2 = manager.add("conn-2".to_string(), None).await;
    assert_eq!(manager.connection_count().await, 2);

    manager.shutdown_all().await;

    assert_eq!(manager.connection_count().await, 0);

    let msg1 = rx1.recv().await.expect("rx1 should receive Close");
    assert!(
        matches!(msg1, Message::Close(None)),
        "Expected Close(None), got: {msg1:?}"
    );

    let msg2 = rx2.recv().await.expect("rx2 should receive Close");
    assert!(
        matches!(msg2, Message::Close(None)),
        "Expected Close(None), got: {msg2:?}"
    );

    // After Close, the channel should be closed (no more messages).
    assert!(
        rx1.recv().await.is_none(),
        "Channel should be closed after shutdown"
    );
}

// ---------------------------------------------------------------------------
// Test: ping_all() sends a Ping to every connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ping_all_reaches_every_connection() {
    let manager = WsManager::new();

    let mut rx1 = manager.add("conn-1".to_string(), None).await;
    let mut rx2 = manager.add("conn-2".to_string(), None).await;

    manager.ping_all().await;

    assert!(matches!(rx1.recv().await, Some(Message::Ping(_))));
    assert!(matches!(rx2.recv().await, Some(Message::Ping(_))));
}
