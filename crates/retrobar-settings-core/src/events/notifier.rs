//! Synchronous, multi-subscriber change notification.
//!
//! [`ChangeNotifier::publish`] calls every registered callback, in
//! registration order, on the calling thread, with the name of the setting
//! that changed.  There is no buffering and no replay: a callback registered
//! after a change was published never sees it.
//!
//! # Callback isolation
//!
//! Callbacks are invoked after the subscriber list lock has been released,
//! so a callback may read settings, subscribe, or unsubscribe.  A callback
//! that panics is caught and logged; the remaining callbacks still run.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Callback = Arc<dyn Fn(&str) + Send + Sync>;

/// Handle returned by [`ChangeNotifier::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Callback)>,
}

#[derive(Default)]
pub struct ChangeNotifier {
    registry: Mutex<Registry>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `callback` for every future change.
    ///
    /// Subscribing the same closure twice registers it twice.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let mut registry = self.registry();
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry.subscribers.push((id, Arc::new(callback)));
        id
    }

    /// Removes a subscription.  Returns `false` if `id` was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.registry();
        let before = registry.subscribers.len();
        registry.subscribers.retain(|(sid, _)| *sid != id);
        registry.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry().subscribers.len()
    }

    /// Delivers `name` to every subscriber.
    ///
    /// Returns the number of callbacks that completed without panicking.
    pub fn publish(&self, name: &str) -> usize {
        let callbacks: Vec<Callback> = self
            .registry()
            .subscribers
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        let mut delivered = 0;
        for callback in callbacks {
            match panic::catch_unwind(AssertUnwindSafe(|| callback(name))) {
                Ok(()) => delivered += 1,
                Err(_) => tracing::warn!(setting = name, "settings change subscriber panicked"),
            }
        }
        delivered
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
