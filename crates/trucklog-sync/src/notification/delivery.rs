//! Delivery policy — which side effects a stored notification triggers.

use async_trait::async_trait;
use chrono::NaiveTime;

use trucklog_core::traits::alerts::{AlertSink, Toast};
use trucklog_entity::notification::{Notification, NotificationPriority, NotificationSettings};

/// Vibration pattern in milliseconds: pulse, pause, pulse.
pub const VIBRATION_PATTERN: [u64; 3] = [200, 100, 200];

/// Resolved side effects for one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryPlan {
    /// Play the notification tone.
    pub sound: bool,
    /// Trigger vibration.
    pub vibration: bool,
    /// Post an OS-level notification.
    pub os_notification: bool,
    /// Whether the toast is delivered silently (suppressed accompaniment).
    pub toast_silent: bool,
}

/// Decides delivery side effects from the record, the user settings, and the
/// current local time.
///
/// Quiet hours suppress sound, vibration, and the OS notification while the
/// record is still stored and a silent toast still shows; `urgent` always
/// breaks through. The OS notification additionally requires the user toggle
/// and granted permission, and fires for urgent or persistent records.
pub fn plan_delivery(
    notification: &Notification,
    settings: &NotificationSettings,
    now: NaiveTime,
) -> DeliveryPlan {
    let quiet = settings.quiet_hours.contains(now)
        && notification.priority != NotificationPriority::Urgent;

    let sound = !quiet && notification.sound && settings.sound_enabled;
    let vibration = !quiet && notification.vibration && settings.vibration_enabled;
    let os_notification = !quiet
        && (notification.priority == NotificationPriority::Urgent || notification.persistent)
        && settings.browser_notifications_enabled
        && settings.os_permission_granted;

    DeliveryPlan {
        sound,
        vibration,
        os_notification,
        toast_silent: !sound && !vibration,
    }
}

/// Executes a delivery plan against the host capabilities. Every capability
/// call degrades to a no-op inside the sink; failures do not exist at this
/// level.
pub async fn deliver(plan: DeliveryPlan, notification: &Notification, sink: &dyn AlertSink) {
    if plan.sound {
        sink.play_sound().await;
    }
    if plan.vibration {
        sink.vibrate(&VIBRATION_PATTERN).await;
    }
    if plan.os_notification {
        sink.os_notification(&notification.title, &notification.message)
            .await;
    }
    sink.show_toast(Toast {
        id: notification.id.clone(),
        title: notification.title.clone(),
        message: notification.message.clone(),
        kind: notification.notification_type.as_str().to_string(),
        silent: plan.toast_silent,
    })
    .await;
}

/// Sink for headless contexts: every capability is absent.
#[derive(Debug, Default)]
pub struct NoopAlertSink;

#[async_trait]
impl AlertSink for NoopAlertSink {
    async fn play_sound(&self) {}

    async fn vibrate(&self, _pattern: &[u64]) {}

    async fn request_permission(&self) -> bool {
        false
    }

    async fn os_notification(&self, _title: &str, _body: &str) -> bool {
        false
    }

    async fn show_toast(&self, _toast: Toast) {}

    async fn clear_toast(&self, _id: &str) {}
}
