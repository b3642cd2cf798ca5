//! Delivery side-effect capabilities (sound, vibration, OS notification, toast).
//!
//! The host environment provides these capabilities; every one of them must
//! degrade to a silent no-op when absent or denied. Absence is never an error.

use async_trait::async_trait;

/// A transient on-screen toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Identifier matching the notification that produced the toast.
    pub id: String,
    /// Toast title.
    pub title: String,
    /// Toast body text.
    pub message: String,
    /// Notification type string driving visual styling.
    pub kind: String,
    /// Whether the toast is delivered without sound/vibration accompaniment.
    pub silent: bool,
}

/// Host delivery capabilities for notification side effects.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Play the notification tone. No-op when audio is unavailable.
    async fn play_sound(&self);

    /// Trigger device vibration with the given millisecond pattern.
    /// No-op when the vibration capability is absent.
    async fn vibrate(&self, pattern: &[u64]);

    /// Request permission to post OS-level notifications.
    /// Returns whether permission is granted.
    async fn request_permission(&self) -> bool;

    /// Post an OS-level notification. Returns whether it was delivered;
    /// `false` (not an error) when permission is missing or the capability
    /// is absent.
    async fn os_notification(&self, title: &str, body: &str) -> bool;

    /// Show a toast.
    async fn show_toast(&self, toast: Toast);

    /// Clear any visible toast for the given notification id.
    async fn clear_toast(&self, id: &str);
}
