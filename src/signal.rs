//! Push-based notification primitive.
//!
//! Every producer in the crate (readiness store, scroll signal, frame clock)
//! owns a [`Broadcaster`]. Consumers register callbacks and receive each new
//! value synchronously, within the same tick that produced it.
//!
//! # Re-entrancy
//!
//! Callbacks run with no lock held, on a snapshot of the subscriber list, so a
//! callback may subscribe, unsubscribe, or trigger another emission on the same
//! broadcaster. A nested emission does not recurse: it is parked and the outer
//! dispatch loop delivers it once the current round completes. Consumers
//! therefore always observe values in emission order and finish on the newest.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

new_key_type! {
    /// Key of one registered subscriber.
    pub struct SubscriberKey;
}

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<T> {
    subscribers: SlotMap<SubscriberKey, Callback<T>>,
    dispatching: bool,
    pending: Vec<T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            subscribers: SlotMap::with_key(),
            dispatching: false,
            pending: Vec::new(),
        }
    }
}

/// Clears the dispatching flag if a callback unwinds mid-round.
struct DispatchGuard<'a, T> {
    registry: &'a Mutex<Registry<T>>,
    armed: bool,
}

impl<T> Drop for DispatchGuard<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            let mut registry = self.registry.lock();
            registry.dispatching = false;
            registry.pending.clear();
        }
    }
}

/// A list of subscriber callbacks with synchronous delivery.
pub struct Broadcaster<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T> Default for Broadcaster<T> {
    fn default() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::default())),
        }
    }
}

impl<T: Clone + Send + 'static> Broadcaster<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback. It stays registered until the returned
    /// [`Subscription`] is dropped.
    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let key = self.registry.lock().subscribers.insert(Arc::new(callback));
        let weak: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.registry);

        Subscription::new(move || {
            if let Some(registry) = weak.upgrade() {
                registry.lock().subscribers.remove(key);
            }
        })
    }

    /// Registers a channel-backed subscriber. Values are cloned into an
    /// unbounded [`flume`] channel for consumers that prefer draining a queue.
    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe_channel(&self) -> (flume::Receiver<T>, Subscription) {
        let (tx, rx) = flume::unbounded();
        let subscription = self.subscribe(move |value: &T| {
            // A dropped receiver just stops listening.
            let _ = tx.send(value.clone());
        });
        (rx, subscription)
    }

    /// Delivers `value` to every current subscriber.
    pub fn emit(&self, value: T) {
        {
            let mut registry = self.registry.lock();
            if registry.dispatching {
                registry.pending.push(value);
                return;
            }
            registry.dispatching = true;
        }

        let mut guard = DispatchGuard {
            registry: &self.registry,
            armed: true,
        };

        let mut current = value;
        loop {
            let snapshot: SmallVec<[(SubscriberKey, Callback<T>); 8]> = self
                .registry
                .lock()
                .subscribers
                .iter()
                .map(|(key, cb)| (key, Arc::clone(cb)))
                .collect();

            for (key, callback) in &snapshot {
                // Skip anything unsubscribed earlier in this round.
                if !self.registry.lock().subscribers.contains_key(*key) {
                    continue;
                }
                callback(&current);
            }

            let mut registry = self.registry.lock();
            if registry.pending.is_empty() {
                registry.dispatching = false;
                guard.armed = false;
                break;
            }
            current = registry.pending.remove(0);
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.registry.lock().subscribers.len()
    }
}

/// RAII registration handle returned by [`Broadcaster::subscribe`].
///
/// Dropping it removes the callback; a callback removed this way is never
/// invoked again, even by a dispatch round already in flight.
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    fn new(unsubscribe: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Explicit form of dropping the handle.
    pub fn unsubscribe(mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(f) = self.unsubscribe.take() {
            f();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}
