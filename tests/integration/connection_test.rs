//! Connection status derivation across reconnect cycles.

use trucklog_sync::transport::ConnectionState;
use trucklog_sync::ConnectionQuality;

use crate::helpers;

#[tokio::test]
async fn test_reconnect_cycle_status() {
    let transport = helpers::MockTransport::new();
    let backend = helpers::MockBackend::new();
    let sink = helpers::RecordingSink::new();
    let session = helpers::build_session(transport.clone(), backend, sink).await;
    session.start().await;
    helpers::settle().await;

    // Cold connect: not a reconnect.
    let status = session.connection_status();
    assert!(status.is_connected);
    assert!(!status.is_reconnecting);

    // Drop.
    transport.fire_disconnected(Some("poll unavailable"));
    helpers::settle().await;
    let status = session.connection_status();
    assert!(!status.is_connected);
    assert!(status.is_reconnecting);
    assert_eq!(status.last_error.as_deref(), Some("poll unavailable"));
    assert_eq!(status.metrics.quality, ConnectionQuality::Disconnected);

    // Reconnecting.
    transport.set_state(ConnectionState::Connecting);
    let status = session.connection_status();
    assert!(status.is_connecting);
    assert!(status.is_reconnecting);

    // Recovered.
    transport.fire_connected();
    helpers::settle().await;
    let status = session.connection_status();
    assert!(status.is_connected);
    assert!(!status.is_reconnecting);
    assert_eq!(status.metrics.reconnect_attempts, 1);
    // Uptime restarted at the second connect.
    assert!(status.metrics.uptime_ms < 1000);
    assert!(status.last_error.is_none());

    session.shutdown().await;
}

#[tokio::test]
async fn test_latency_grades_quality() {
    let transport = helpers::MockTransport::new();
    let backend = helpers::MockBackend::new();
    let sink = helpers::RecordingSink::new();
    let session = helpers::build_session(transport.clone(), backend, sink).await;
    session.start().await;
    helpers::settle().await;

    transport.fire_latency(40);
    helpers::settle().await;
    assert_eq!(
        session.connection_status().metrics.quality,
        ConnectionQuality::Excellent
    );

    transport.fire_latency(800);
    helpers::settle().await;
    assert_eq!(
        session.connection_status().metrics.quality,
        ConnectionQuality::Fair
    );

    session.shutdown().await;
}

#[tokio::test]
async fn test_message_counters_track_traffic() {
    let transport = helpers::MockTransport::new();
    let backend = helpers::MockBackend::new();
    let sink = helpers::RecordingSink::new();
    let session = helpers::build_session(transport.clone(), backend, sink).await;
    session.start().await;
    helpers::settle().await;

    transport.fire_message("hos_updates", serde_json::json!({}));
    helpers::settle().await;
    assert!(session.send(serde_json::json!({"type": "ping"})).await);

    let metrics = session.connection_status().metrics;
    assert_eq!(metrics.messages_received, 1);
    assert_eq!(metrics.messages_sent, 1);

    session.shutdown().await;
}
