use crate::shared::infrastructure::notifications::{Notification, Notifier};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct InMemoryNotifier {
    delivered: Mutex<Vec<Notification>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Notifier for InMemoryNotifier {
    fn notify(&self, notification: Notification) {
        self.delivered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(notification);
    }
}
