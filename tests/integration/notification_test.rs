//! End-to-end notification flow through the session container.

use trucklog_entity::notification::{NotificationDraft, NotificationPriority, NotificationType};

use crate::helpers;

#[tokio::test]
async fn test_urgent_show_dismiss_end_to_end() {
    let transport = helpers::MockTransport::new();
    let backend = helpers::MockBackend::new();
    let sink = helpers::RecordingSink::new();
    let session = helpers::build_session(transport, backend, sink.clone()).await;
    session.start().await;

    let shown = session
        .notifications()
        .show(
            NotificationDraft::new("X", "Y", NotificationType::Error)
                .priority(NotificationPriority::Urgent),
        )
        .await;

    let all = session.notifications().get_all();
    assert_eq!(all.len(), 1);
    assert!(all[0].persistent);
    assert_eq!(sink.toasts.lock().unwrap().len(), 1);

    session.notifications().dismiss(&shown.id).await;
    assert!(session.notifications().get_all().is_empty());
    assert!(sink.toasts.lock().unwrap().is_empty());

    session.shutdown().await;
}

#[tokio::test]
async fn test_pushed_notification_lands_in_store() {
    let transport = helpers::MockTransport::new();
    let backend = helpers::MockBackend::new();
    let sink = helpers::RecordingSink::new();
    let session = helpers::build_session(transport.clone(), backend.clone(), sink).await;
    session.start().await;

    let payload = serde_json::json!({
        "id": 21,
        "title": "Break required",
        "message": "30-minute break due in 15 minutes",
        "notification_type": "hos_violation",
        "priority": 2,
        "created_at": "2026-08-01T12:00:00Z",
        "data": {"category": "hos_compliance"}
    });
    transport.fire_message("notifications", payload);
    helpers::settle().await;

    let record = session
        .notifications()
        .get("backend-21")
        .expect("pushed notification stored");
    assert_eq!(record.category, "hos_compliance");
    assert_eq!(record.priority, NotificationPriority::High);
    // A server-pushed record is never echoed back as a create.
    assert!(backend.created.lock().unwrap().is_empty());

    session.shutdown().await;
}

#[tokio::test]
async fn test_local_show_syncs_to_backend() {
    let transport = helpers::MockTransport::new();
    let backend = helpers::MockBackend::new();
    let sink = helpers::RecordingSink::new();
    let session = helpers::build_session(transport, backend.clone(), sink).await;
    session.start().await;

    session
        .notifications()
        .show(NotificationDraft::new("Local", "Created here", NotificationType::Info))
        .await;
    helpers::settle().await;

    let created = backend.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].title, "Local");
    drop(created);

    session.shutdown().await;
}

#[tokio::test]
async fn test_load_from_backend_respects_read_ledger() {
    let transport = helpers::MockTransport::new();
    let backend = helpers::MockBackend::new();
    let sink = helpers::RecordingSink::new();
    backend
        .rows
        .lock()
        .unwrap()
        .extend([helpers::backend_row(1, "a"), helpers::backend_row(2, "b")]);

    let session = helpers::build_session(transport, backend.clone(), sink).await;
    session.start().await;

    session.notifications().load_from_backend().await.unwrap();
    assert_eq!(session.notifications().get_unread().len(), 2);

    session.notifications().mark_as_read("backend-1").await.unwrap();

    // A second reload rebuilds the records; the ledger keeps row 1 read.
    session.notifications().load_from_backend().await.unwrap();
    let unread = session.notifications().get_unread();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].id, "backend-2");

    session.shutdown().await;
}
