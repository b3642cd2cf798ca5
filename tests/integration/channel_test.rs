//! Channel subscription idempotency and trip scope management.

use trucklog_sync::SyncChannel;

use crate::helpers;

#[tokio::test]
async fn test_standing_channels_subscribed_once() {
    let transport = helpers::MockTransport::new();
    let backend = helpers::MockBackend::new();
    let sink = helpers::RecordingSink::new();
    let session = helpers::build_session(transport.clone(), backend, sink).await;
    session.start().await;
    helpers::settle().await;

    let channels = session.subscribed_channels();
    assert_eq!(channels, vec!["hos_updates", "notifications", "trip_updates"]);

    let wired = transport.wire_channels.lock().unwrap().clone();
    assert!(wired.contains("hos_updates"));
    assert!(wired.contains("notifications"));
    assert!(wired.contains("trip_updates"));
    assert_eq!(wired.len(), 3);

    session.shutdown().await;
}

#[tokio::test]
async fn test_watch_trip_roundtrip() {
    let transport = helpers::MockTransport::new();
    let backend = helpers::MockBackend::new();
    let sink = helpers::RecordingSink::new();
    let session = helpers::build_session(transport.clone(), backend, sink).await;
    session.start().await;
    helpers::settle().await;

    session.watch_trip(42).await;
    session.watch_trip(42).await;
    assert!(
        session
            .subscribed_channels()
            .contains(&"trip_42".to_string())
    );
    assert!(transport.wire_channels.lock().unwrap().contains("trip_42"));

    // The trip completes and leaves scope.
    session.unwatch_trip(42).await;
    assert!(
        !session
            .subscribed_channels()
            .contains(&"trip_42".to_string())
    );
    assert!(!transport.wire_channels.lock().unwrap().contains("trip_42"));

    session.shutdown().await;
}

#[tokio::test]
async fn test_offline_subscription_replays_on_reconnect() {
    let transport = helpers::MockTransport::new();
    let backend = helpers::MockBackend::new();
    let sink = helpers::RecordingSink::new();
    let session = helpers::build_session(transport.clone(), backend, sink).await;
    session.start().await;
    helpers::settle().await;

    // Drop the connection; a real transport clears its wire bookkeeping.
    transport.fire_disconnected(Some("dropped"));
    transport.wire_channels.lock().unwrap().clear();

    // Desired while disconnected.
    session.watch_trip(7).await;
    assert!(!transport.wire_channels.lock().unwrap().contains("trip_7"));

    // Reconnect replays every desired channel, the trip included.
    transport.fire_connected();
    helpers::settle().await;
    let wired = transport.wire_channels.lock().unwrap().clone();
    assert!(wired.contains("trip_7"));
    assert!(wired.contains(&SyncChannel::Notifications.name()));

    session.shutdown().await;
}
