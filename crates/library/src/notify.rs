//! Change notifications.
//!
//! The library never broadcasts anything itself. Whoever drives it creates a
//! channel with [`Notifier::channel`], hands the [`Notifier`] to the
//! [`Context`](crate::Context), and decides what to do with the receiving end.

use derive_more::Display;
pub use lnauto_store::NotificationKind;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("[{kind}] {message}")]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}
impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Info, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Error, message: message.into() }
    }
}

/// Sending half of the notification channel.
///
/// Delivery is best effort: a closed or missing receiver is not an error.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    sender: Option<UnboundedSender<Notification>>,
}
impl Notifier {
    pub fn channel() -> (Self, UnboundedReceiver<Notification>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender: Some(sender) }, receiver)
    }

    /// A notifier that drops everything.
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    pub fn send(&self, notification: Notification) {
        let Some(sender) = &self.sender else {
            return;
        };
        if let Err(e) = sender.send(notification) {
            debug!(notification = %e.0, "notification receiver is gone");
        }
    }

    pub fn send_all(&self, notifications: impl IntoIterator<Item = Notification>) {
        notifications.into_iter().for_each(|n| self.send(n));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_notifications_arrive_in_order() {
        let (notifier, mut receiver) = Notifier::channel();
        notifier.send_all([Notification::success("first"), Notification::info("second")]);
        assert_eq!(receiver.recv().await, Some(Notification::success("first")));
        assert_eq!(receiver.recv().await, Some(Notification::info("second")));
    }

    #[test]
    fn test_closed_receiver_is_ignored() {
        let (notifier, receiver) = Notifier::channel();
        drop(receiver);
        notifier.send(Notification::error("nobody is listening"));
        Notifier::disabled().send(Notification::info("nor here"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Notification::info("New book").to_string(), "[info] New book");
    }
}
