//! Subscriber fan-out for toast state snapshots.
//!
//! # Responsibility
//! - Keep registered listeners in subscription order.
//! - Deliver each snapshot to every listener synchronously. When another
//!   thread is already delivering, it delivers the new snapshot too, in
//!   queue order.
//!
//! # Invariants
//! - Listeners are invoked without the registry lock held, so a listener may
//!   subscribe, unsubscribe or dispatch from inside its callback.
//! - Snapshots are delivered in the order they were enqueued, by one thread
//!   at a time.
//! - A dropped `Subscription` receives no later snapshots.

use crate::store::reducer::ToastState;
use std::collections::VecDeque;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Snapshot callback type.
pub type Listener = Arc<dyn Fn(&ToastState) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

#[derive(Default)]
struct Outbox {
    pending: VecDeque<ToastState>,
    delivering: bool,
}

/// Ordered set of snapshot listeners.
#[derive(Default)]
pub struct SubscriberRegistry {
    inner: Arc<Mutex<Listeners>>,
    outbox: Mutex<Outbox>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener`. It stays registered while the guard lives.
    pub fn subscribe(
        &self,
        listener: impl Fn(&ToastState) + Send + Sync + 'static,
    ) -> Subscription {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.next_id += 1;
        let id = guard.next_id;
        guard.entries.push((id, Arc::new(listener)));
        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invokes every listener registered at call time, in order.
    pub fn broadcast(&self, state: &ToastState) {
        let listeners: Vec<Listener> = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(state);
        }
    }

    /// Queues `state` for delivery. Call order defines delivery order.
    pub fn enqueue(&self, state: ToastState) {
        self.lock_outbox().pending.push_back(state);
    }

    /// Delivers queued snapshots unless another caller is already doing so.
    ///
    /// A snapshot queued while delivery is running (from another thread or
    /// from inside a listener) is delivered by the running caller.
    pub fn deliver_pending(&self) {
        {
            let mut outbox = self.lock_outbox();
            if outbox.delivering {
                return;
            }
            outbox.delivering = true;
        }
        let mut reset = DeliveryReset {
            outbox: &self.outbox,
            armed: true,
        };

        loop {
            let state = {
                let mut outbox = self.lock_outbox();
                let Some(state) = outbox.pending.pop_front() else {
                    // Why: the flag must drop in the same critical section
                    // that saw the queue empty, or a concurrent enqueue could
                    // be left undelivered.
                    outbox.delivering = false;
                    reset.armed = false;
                    return;
                };
                state
            };
            self.broadcast(&state);
        }
    }

    /// Drops every listener and undelivered snapshot. Outstanding guards
    /// become inert.
    pub fn clear(&self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .clear();
        self.lock_outbox().pending.clear();
    }

    fn lock_outbox(&self) -> MutexGuard<'_, Outbox> {
        self.outbox.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the `delivering` flag when a listener panics mid-delivery.
struct DeliveryReset<'a> {
    outbox: &'a Mutex<Outbox>,
    armed: bool,
}

impl Drop for DeliveryReset<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.outbox
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .delivering = false;
        }
    }
}

impl Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

/// Registration guard. Unsubscribes on drop.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Listeners>>,
}

impl Subscription {
    /// A guard that was never registered.
    pub(crate) fn inert() -> Self {
        Self {
            id: 0,
            registry: Weak::new(),
        }
    }

    /// Unsubscribes now. Equivalent to dropping the guard.
    pub fn unsubscribe(self) {}

    /// Whether the listener is still registered.
    pub fn is_active(&self) -> bool {
        self.registry.upgrade().is_some_and(|inner| {
            inner
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entries
                .iter()
                .any(|(id, _)| *id == self.id)
        })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.registry.upgrade() {
            inner
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entries
                .retain(|(id, _)| *id != self.id);
        }
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{SubscriberRegistry, Subscription};
    use crate::store::reducer::ToastState;
    use std::sync::{Arc, Mutex};

    fn state(revision: u64) -> ToastState {
        ToastState {
            toasts: vec![],
            revision,
        }
    }

    #[test]
    fn broadcasts_in_subscription_order() {
        let registry = SubscriberRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first_seen = Arc::clone(&seen);
        let _first = registry.subscribe(move |s| {
            first_seen.lock().unwrap().push(("first", s.revision));
        });
        let second_seen = Arc::clone(&seen);
        let _second = registry.subscribe(move |s| {
            second_seen.lock().unwrap().push(("second", s.revision));
        });

        registry.broadcast(&state(1));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![("first", 1), ("second", 1)]
        );
    }

    #[test]
    fn dropped_subscription_stops_receiving() {
        let registry = SubscriberRegistry::new();
        let count = Arc::new(Mutex::new(0));

        let counter = Arc::clone(&count);
        let subscription = registry.subscribe(move |_| *counter.lock().unwrap() += 1);
        assert!(subscription.is_active());

        registry.broadcast(&state(1));
        subscription.unsubscribe();
        registry.broadcast(&state(2));

        assert_eq!(*count.lock().unwrap(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn enqueued_snapshots_are_delivered_in_order() {
        let registry = SubscriberRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _subscription = registry.subscribe(move |s| sink.lock().unwrap().push(s.revision));

        registry.enqueue(state(1));
        registry.enqueue(state(2));
        registry.deliver_pending();
        registry.deliver_pending();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn snapshot_enqueued_by_listener_is_delivered_after_current_one() {
        let registry = Arc::new(SubscriberRegistry::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let inner = Arc::downgrade(&registry);
        let _subscription = registry.subscribe(move |s| {
            sink.lock().unwrap().push(s.revision);
            if s.revision == 1 {
                if let Some(registry) = inner.upgrade() {
                    registry.enqueue(state(2));
                    registry.deliver_pending();
                }
            }
        });

        registry.enqueue(state(1));
        registry.deliver_pending();
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn inert_subscription_is_never_active() {
        assert!(!Subscription::inert().is_active());
    }

    #[test]
    fn clear_makes_guards_inert() {
        let registry = SubscriberRegistry::new();
        let subscription = registry.subscribe(|_| {});
        registry.clear();
        assert!(!subscription.is_active());
        drop(subscription);
        assert_eq!(registry.len(), 0);
    }
}
