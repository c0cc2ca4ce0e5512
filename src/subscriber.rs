//! Push subscriptions
//!
//! Subscribers are called synchronously on the logging thread, under the logger lock
//! in thread-safe mode. A slow subscriber stalls every other caller, and a subscriber
//! must never log through the logger that is calling it.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::level::Level;

/// Receiver of log events
pub trait LogSubscriber: Send + Sync {
    /// Called once per matching event
    fn on_event(&self, date: &str, text: &str, level: Level);
}

impl<F> LogSubscriber for F
where
    F: Fn(&str, &str, Level) + Send + Sync,
{
    fn on_event(&self, date: &str, text: &str, level: Level) {
        self(date, text, level)
    }
}

struct Subscription {
    subscriber: Arc<dyn LogSubscriber>,
    level: Level,
}

/// Registered subscribers in registration order
#[derive(Default)]
pub struct SubscriptionRegistry {
    entries: Vec<Subscription>,
}

impl std::fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("len", &self.entries.len())
            .field("min_level", &self.min_level())
            .finish()
    }
}

impl SubscriptionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscription. The same subscriber may be registered more than once
    pub fn register(&mut self, subscriber: Arc<dyn LogSubscriber>, level: Level) {
        self.entries.push(Subscription {
            subscriber,
            level: level.clamp_real(),
        });
    }

    /// Lowest threshold of any subscription, `Off` when empty
    pub fn min_level(&self) -> Level {
        self.entries
            .iter()
            .map(|s| s.level)
            .min()
            .unwrap_or(Level::Off)
    }

    /// Deliver an event to every matching subscription
    ///
    /// A panicking subscriber is skipped; delivery continues with the next one.
    /// Returns the number of subscribers that panicked.
    pub fn notify(&self, date: &str, text: &str, level: Level) -> usize {
        let mut failures = 0;
        for (index, entry) in self.entries.iter().enumerate() {
            if level < entry.level {
                continue;
            }
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                entry.subscriber.on_event(date, text, level)
            }));
            if result.is_err() {
                failures += 1;
                tracing::warn!("Log subscriber #{} panicked while handling an event", index);
            }
        }
        failures
    }

    /// Number of subscriptions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
