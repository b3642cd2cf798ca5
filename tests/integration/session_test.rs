//! Session lifecycle: startup wiring and teardown.

use trucklog_sync::transport::ConnectionState;
use trucklog_sync::Transport;

use crate::helpers;

#[tokio::test]
async fn test_start_connects_and_shutdown_resets() {
    let transport = helpers::MockTransport::new();
    let backend = helpers::MockBackend::new();
    let sink = helpers::RecordingSink::new();
    let session = helpers::build_session(transport.clone(), backend, sink).await;

    session.start().await;
    helpers::settle().await;
    assert!(session.connection_status().is_connected);

    session.shutdown().await;
    assert_eq!(transport.state(), ConnectionState::Disconnected);

    // The snapshot is back to disconnected defaults: a new session never
    // inherits the previous session's counters.
    let status = session.connection_status();
    assert!(!status.is_connected);
    assert!(!status.is_reconnecting);
    assert_eq!(status.metrics.reconnect_attempts, 0);
    assert!(status.metrics.last_connected.is_none());
}

#[tokio::test]
async fn test_send_requires_connection() {
    let transport = helpers::MockTransport::new();
    let backend = helpers::MockBackend::new();
    let sink = helpers::RecordingSink::new();
    let session = helpers::build_session(transport.clone(), backend, sink).await;

    // Not started: the transport is disconnected.
    assert!(!session.send(serde_json::json!({"type": "ping"})).await);

    session.start().await;
    assert!(session.send(serde_json::json!({"type": "ping"})).await);
    assert_eq!(transport.sent.lock().unwrap().len(), 1);

    session.shutdown().await;
}
