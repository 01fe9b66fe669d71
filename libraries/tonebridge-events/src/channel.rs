//! Weak-reference publish/subscribe channel
//!
//! Subscribers are held weakly: registering never keeps an observer alive,
//! and a dropped observer simply stops receiving. Delivery is synchronous
//! on the posting thread and happens outside the subscription lock, so a
//! callback may register, unregister or post to other categories.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};

use tracing::{debug, trace, warn};

use crate::error::{ChannelError, Result};
use crate::notification::Notification;

/// Receiver of notifications
pub trait Subscriber: Send + Sync {
    fn on_notification(&self, notification: &Notification);
}

/// Identifies one registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    subscriber: Weak<dyn Subscriber>,
    categories: BTreeSet<i32>,
    /// Cleared by the first matching post, which is swallowed
    awaiting_first: bool,
}

impl Subscription {
    fn is_for(&self, subscriber: *const ()) -> bool {
        self.subscriber.as_ptr().cast::<()>() == subscriber
    }
}

thread_local! {
    /// (channel, category) pairs being delivered on this thread
    static DELIVERING: RefCell<Vec<(usize, i32)>> = const { RefCell::new(Vec::new()) };
}

/// Pops the delivery marker even if a subscriber panics
struct DeliveryGuard {
    key: (usize, i32),
}

impl DeliveryGuard {
    fn enter(key: (usize, i32)) -> Option<Self> {
        DELIVERING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.contains(&key) {
                None
            } else {
                stack.push(key);
                Some(Self { key })
            }
        })
    }
}

impl Drop for DeliveryGuard {
    fn drop(&mut self) {
        DELIVERING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(pos) = stack.iter().rposition(|key| *key == self.key) {
                stack.remove(pos);
            }
        });
    }
}

/// Category-filtered fan-out to weakly held subscribers
pub struct NotificationChannel {
    subscriptions: Mutex<Vec<Subscription>>,
    next_id: AtomicU64,
}

impl NotificationChannel {
    pub fn new() -> Self {
        Self {
            subscriptions: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Process-wide channel
    pub fn global() -> &'static NotificationChannel {
        static GLOBAL: OnceLock<NotificationChannel> = OnceLock::new();
        GLOBAL.get_or_init(NotificationChannel::new)
    }

    /// Subscribe to `categories`.
    ///
    /// The first notification matching this subscription is swallowed, so
    /// a post already in flight when registering is never acted upon.
    pub fn register<S>(&self, subscriber: &Arc<S>, categories: impl IntoIterator<Item = i32>) -> SubscriptionId
    where
        S: Subscriber + 'static,
    {
        let strong: Arc<dyn Subscriber> = Arc::<S>::clone(subscriber);
        let weak = Arc::downgrade(&strong);
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let categories: BTreeSet<i32> = categories.into_iter().collect();
        debug!(subscription = id.0, categories = ?categories, "Registered subscriber");

        self.lock().push(Subscription {
            id,
            subscriber: weak,
            categories,
            awaiting_first: true,
        });
        id
    }

    /// Drop every subscription of `subscriber`. Unknown subscribers are
    /// ignored.
    pub fn unregister<S>(&self, subscriber: &Arc<S>)
    where
        S: Subscriber + 'static,
    {
        let target = Arc::as_ptr(subscriber).cast::<()>();
        let mut subscriptions = self.lock();
        let before = subscriptions.len();
        subscriptions.retain(|sub| !sub.is_for(target));
        if subscriptions.len() != before {
            debug!(removed = before - subscriptions.len(), "Unregistered subscriber");
        }
    }

    /// Drop one subscription. Unknown ids are ignored.
    pub fn unregister_id(&self, id: SubscriptionId) {
        self.lock().retain(|sub| sub.id != id);
    }

    /// Live subscriptions
    pub fn subscription_count(&self) -> usize {
        self.lock()
            .iter()
            .filter(|sub| sub.subscriber.strong_count() > 0)
            .count()
    }

    /// Deliver `notification` to every live subscription of its category on
    /// the calling thread. Returns the number of subscribers reached.
    ///
    /// Posting into a category while it is being delivered on the same
    /// thread fails with [`ChannelError::Reentrant`] instead of recursing.
    pub fn post(&self, notification: &Notification) -> Result<usize> {
        let category = notification.category;
        let Some(_guard) = DeliveryGuard::enter((self as *const Self as usize, category)) else {
            warn!(category, event = notification.event, "Reentrant post rejected");
            return Err(ChannelError::Reentrant { category });
        };

        let targets = self.collect_targets(category);
        for subscriber in &targets {
            subscriber.on_notification(notification);
        }
        trace!(category, event = notification.event, delivered = targets.len(), "Posted");
        Ok(targets.len())
    }

    fn collect_targets(&self, category: i32) -> Vec<Arc<dyn Subscriber>> {
        let mut subscriptions = self.lock();
        subscriptions.retain(|sub| sub.subscriber.strong_count() > 0);

        let mut targets = Vec::new();
        for sub in subscriptions.iter_mut() {
            if !sub.categories.contains(&category) {
                continue;
            }
            if sub.awaiting_first {
                sub.awaiting_first = false;
                continue;
            }
            if let Some(subscriber) = sub.subscriber.upgrade() {
                targets.push(subscriber);
            }
        }
        targets
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Subscription>> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NotificationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationChannel")
            .field("subscriptions", &self.lock().len())
            .finish()
    }
}
