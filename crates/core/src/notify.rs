//! # Notifications
//!
//! User-visible confirmations for install and uninstall. Exactly one
//! notification is delivered, synchronously, per registry call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

/// What happened to the app
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Installed,
    Uninstalled,
}

/// A confirmation naming the affected app
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub app_name: String,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn installed(app_name: impl Into<String>) -> Self {
        Self::new(NotificationKind::Installed, app_name)
    }

    pub fn uninstalled(app_name: impl Into<String>) -> Self {
        Self::new(NotificationKind::Uninstalled, app_name)
    }

    fn new(kind: NotificationKind, app_name: impl Into<String>) -> Self {
        Self {
            kind,
            app_name: app_name.into(),
            timestamp: Utc::now(),
        }
    }

    /// Display text for the confirmation
    pub fn message(&self) -> String {
        match self.kind {
            NotificationKind::Installed => {
                format!("{} installed! Find it in Start Menu.", self.app_name)
            }
            NotificationKind::Uninstalled => format!("{} uninstalled.", self.app_name),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Receives confirmations. Called on the registry caller's thread before
/// the install/uninstall call returns.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Writes confirmations to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        tracing::info!("{}", notification.message());
    }
}

/// Fans confirmations out to subscribers, such as an SSE stream
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<Notification>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, notification: &Notification) {
        tracing::info!("{}", notification.message());
        // No subscribers is not an error
        let _ = self.tx.send(notification.clone());
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Keeps every notification it receives
    #[derive(Default)]
    pub struct RecordingNotifier {
        seen: Mutex<Vec<Notification>>,
    }

    impl RecordingNotifier {
        pub fn messages(&self) -> Vec<String> {
            self.seen
                .lock()
                .unwrap()
                .iter()
                .map(Notification::message)
                .collect()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: &Notification) {
            self.seen.lock().unwrap().push(notification.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            Notification::installed("Calculator").message(),
            "Calculator installed! Find it in Start Menu."
        );
        assert_eq!(
            Notification::uninstalled("Notepad").to_string(),
            "Notepad uninstalled."
        );
    }

    #[tokio::test]
    async fn test_broadcast_reaches_subscriber() {
        let notifier = BroadcastNotifier::new(8);
        let mut rx = notifier.subscribe();

        notifier.notify(&Notification::installed("Paint"));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.kind, NotificationKind::Installed);
        assert_eq!(received.app_name, "Paint");
    }

    #[test]
    fn test_broadcast_without_subscribers() {
        let notifier = BroadcastNotifier::new(8);
        notifier.notify(&Notification::uninstalled("Paint"));
    }
}
