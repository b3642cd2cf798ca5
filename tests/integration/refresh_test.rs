//! Refresh controller behavior through the session container.

use std::sync::atomic::Ordering;

use trucklog_entity::trip::TripStatus;

use crate::helpers;

#[tokio::test]
async fn test_start_fetches_both_domains_once() {
    let transport = helpers::MockTransport::new();
    let backend = helpers::MockBackend::new();
    let sink = helpers::RecordingSink::new();
    let session = helpers::build_session(transport, backend.clone(), sink).await;
    session.start().await;

    assert_eq!(backend.hos_fetches.load(Ordering::SeqCst), 1);
    assert_eq!(backend.trip_fetches.load(Ordering::SeqCst), 1);
    assert!(session.hos().status().is_some());
    assert_eq!(session.trips().trips().len(), 1);

    session.shutdown().await;
}

#[tokio::test]
async fn test_tick_within_guard_issues_no_fetch() {
    let transport = helpers::MockTransport::new();
    let backend = helpers::MockBackend::new();
    let sink = helpers::RecordingSink::new();
    let session = helpers::build_session(transport.clone(), backend.clone(), sink).await;
    session.start().await;
    helpers::settle().await;

    // A push arrives over the connected transport.
    transport.fire_message(
        "hos_updates",
        serde_json::to_value(helpers::sample_hos_status()).unwrap(),
    );
    helpers::settle().await;

    // A timer tick inside the guard window after the last fetch/push
    // must not hit the backend again.
    session.hos().tick().await;
    session.trips().tick().await;
    assert_eq!(backend.hos_fetches.load(Ordering::SeqCst), 1);
    assert_eq!(backend.trip_fetches.load(Ordering::SeqCst), 1);

    session.shutdown().await;
}

#[tokio::test]
async fn test_pushed_trip_update_applies_to_cache() {
    let transport = helpers::MockTransport::new();
    let backend = helpers::MockBackend::new();
    let sink = helpers::RecordingSink::new();
    let session = helpers::build_session(transport.clone(), backend, sink).await;
    session.start().await;
    helpers::settle().await;

    let mut updated = helpers::sample_trip(1, TripStatus::Completed, 4);
    updated.trip_name = "renamed".to_string();
    transport.fire_message("trip_1", serde_json::to_value(&updated).unwrap());
    helpers::settle().await;

    let trips = session.trips().trips();
    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0].trip_name, "renamed");
    assert_eq!(trips[0].status, TripStatus::Completed);

    session.shutdown().await;
}

#[tokio::test]
async fn test_overdue_flag_follows_push() {
    let transport = helpers::MockTransport::new();
    let backend = helpers::MockBackend::new();
    let sink = helpers::RecordingSink::new();
    let session = helpers::build_session(transport.clone(), backend, sink).await;
    session.start().await;
    helpers::settle().await;
    assert!(!session.trips().has_overdue_trips());

    let overdue = helpers::sample_trip(5, TripStatus::InProgress, -3);
    transport.fire_message("trip_updates", serde_json::to_value(&overdue).unwrap());
    helpers::settle().await;
    assert!(session.trips().has_overdue_trips());

    session.shutdown().await;
}
