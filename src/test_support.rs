//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::{Arc, Mutex};

use crate::core::notify::{Notification, Notifier};
use crate::core::store::HistoryStore;

/// A notifier that remembers everything it was asked to show.
#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Returns and clears the recorded notifications.
    pub fn take(&self) -> Vec<Notification> {
        self.seen
            .lock()
            .map(|mut seen| std::mem::take(&mut *seen))
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(notification);
        }
    }
}

/// Creates a store over the built-in seed with a recording notifier.
pub fn test_store() -> (HistoryStore, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    (HistoryStore::seeded(notifier.clone()), notifier)
}
