//! # Notifications
//!
//! Transient, fire-and-forget messages the store raises for the user
//! (currently only "User Added"). The store does not care whether anyone
//! sees them.

use log::{info, warn};
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log only.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        info!("{}: {}", notification.title, notification.description);
    }
}

/// Forwards notifications to the event loop, which shows them as toasts.
pub struct ChannelNotifier {
    sender: UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new(sender: UnboundedSender<Notification>) -> Self {
        Self { sender }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        info!("{}: {}", notification.title, notification.description);
        if self.sender.send(notification).is_err() {
            warn!("Dropped notification: receiver closed");
        }
    }
}
