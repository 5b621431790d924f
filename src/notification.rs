//! Flash notifications that survive a redirect.
//!
//! A handler publishes a message for a user, e.g. after saving a transaction,
//! and the next page the user loads drains their queue and shows the messages
//! as toasts.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use maud::{Markup, html};

use crate::{alert::Alert, auth::UserID};

/// How long a message waits to be shown before it is discarded.
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(10);

/// How many messages are kept per user. Older messages are dropped first.
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 16;

/// A short message for the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
}

impl Notification {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_owned(),
        }
    }
}

#[derive(Debug)]
struct QueuedNotification {
    notification: Notification,
    published_at: Instant,
}

/// A process-wide queue of notifications, one bounded queue per user.
///
/// Cloning the queue is cheap and all clones share the same messages.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    queues: Arc<Mutex<HashMap<UserID, VecDeque<QueuedNotification>>>>,
    ttl: Duration,
    capacity: usize,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_TTL, DEFAULT_NOTIFICATION_CAPACITY)
    }
}

impl NotificationQueue {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            queues: Arc::new(Mutex::new(HashMap::new())),
            ttl,
            capacity,
        }
    }

    /// Add `notification` to the end of `user_id`'s queue.
    pub fn publish(&self, user_id: UserID, notification: Notification) {
        self.publish_at(user_id, notification, Instant::now());
    }

    /// Remove and return all of `user_id`'s unexpired notifications, oldest first.
    pub fn drain(&self, user_id: UserID) -> Vec<Notification> {
        self.drain_at(user_id, Instant::now())
    }

    fn publish_at(&self, user_id: UserID, notification: Notification, now: Instant) {
        if self.capacity == 0 {
            return;
        }

        let Ok(mut queues) = self.queues.lock() else {
            tracing::error!("Could not acquire notification queue lock, dropping notification.");
            return;
        };

        queues.retain(|_, queue| {
            queue.retain(|queued| !self.is_expired(queued, now));
            !queue.is_empty()
        });

        let queue = queues.entry(user_id).or_default();
        while queue.len() >= self.capacity {
            queue.pop_front();
        }

        queue.push_back(QueuedNotification {
            notification,
            published_at: now,
        });
    }

    fn drain_at(&self, user_id: UserID, now: Instant) -> Vec<Notification> {
        let Ok(mut queues) = self.queues.lock() else {
            tracing::error!("Could not acquire notification queue lock.");
            return Vec::new();
        };

        let Some(queue) = queues.remove(&user_id) else {
            return Vec::new();
        };

        queue
            .into_iter()
            .filter(|queued| !self.is_expired(queued, now))
            .map(|queued| queued.notification)
            .collect()
    }

    fn is_expired(&self, queued: &QueuedNotification, now: Instant) -> bool {
        now.saturating_duration_since(queued.published_at) >= self.ttl
    }

    #[cfg(test)]
    fn queued_users(&self) -> usize {
        self.queues.lock().map(|queues| queues.len()).unwrap_or_default()
    }
}

/// Render `notifications` as dismissable toasts in the top right corner.
pub fn notifications_view(notifications: Vec<Notification>) -> Markup {
    html! {
        @if !notifications.is_empty() {
            div
                id="notifications"
                class="fixed top-4 right-4 z-50 w-full max-w-sm space-y-2"
            {
                @for notification in notifications {
                    (Alert::SuccessSimple { message: notification.message }.into_html())
                }
            }
        }
    }
}
