//! Toast center: the dispatch entry point over store, timers and subscribers.
//!
//! # Responsibility
//! - Serialize every dispatch through one lock around state and timers.
//! - Schedule timers as a side effect next to the pure reducer call.
//! - Fan snapshots out to subscribers after each dispatch.
//!
//! # Invariants
//! - Each broadcast snapshot reflects exactly one dispatch.
//! - No timer outlives the toast it belongs to.
//! - Dispatch never fails; unknown ids are no-ops.
//! - After `dispose`, dispatches are dropped.
//! - An Add whose id is already present is dropped.

use crate::config::{ConfigError, ToastConfig};
use crate::model::toast::{Toast, ToastId, ToastOptions, ToastPatch};
use crate::store::reducer::{reduce, ToastIntent, ToastState};
use crate::subscription::{SubscriberRegistry, Subscription};
use crate::timer::clock::{Clock, SystemClock};
use crate::timer::registry::{TimerKind, TimerRegistry};
use log::{debug, info};
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

/// Shared handle to one toast store instance.
///
/// Cloning shares the same instance.
#[derive(Clone)]
pub struct ToastCenter {
    inner: Arc<CenterInner>,
}

struct CenterInner {
    config: ToastConfig,
    clock: Arc<dyn Clock>,
    core: Mutex<CenterCore>,
    subscribers: SubscriberRegistry,
}

#[derive(Default)]
struct CenterCore {
    state: ToastState,
    timers: TimerRegistry,
    disposed: bool,
}

impl ToastCenter {
    /// Creates an isolated center driven by the system clock.
    pub fn new(config: ToastConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates an isolated center driven by `clock`.
    pub fn with_clock(config: ToastConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, clock))
    }

    fn build(config: ToastConfig, clock: Arc<dyn Clock>) -> Self {
        info!(
            "event=toast_center_init module=toast status=ok limit={} remove_delay_ms={} auto_dismiss={}",
            config.limit, config.remove_delay_ms, config.auto_dismiss
        );
        Self {
            inner: Arc::new(CenterInner {
                config,
                clock,
                core: Mutex::new(CenterCore::default()),
                subscribers: SubscriberRegistry::new(),
            }),
        }
    }

    pub fn config(&self) -> &ToastConfig {
        &self.inner.config
    }

    /// Creates a toast and returns a handle to it.
    ///
    /// A missing `duration_ms` is filled in with the configured default.
    pub fn notify(&self, mut options: ToastOptions) -> ToastHandle {
        if options.duration_ms.is_none() {
            options.duration_ms = Some(self.inner.config.default_duration_ms);
        }
        let toast = Toast::new(options);
        let id = toast.id;
        self.inner.dispatch(ToastIntent::Add(toast));
        ToastHandle {
            id,
            center: Arc::downgrade(&self.inner),
        }
    }

    /// Begins dismissal of one toast, or of every toast for `None`.
    pub fn dismiss(&self, id: Option<ToastId>) {
        self.inner.dispatch(ToastIntent::Dismiss(id));
    }

    /// Merges `patch` into the toast with `id`, if present.
    pub fn update(&self, id: ToastId, patch: ToastPatch) {
        self.inner.dispatch(ToastIntent::Update { id, patch });
    }

    /// Purges one toast immediately, or every toast for `None`.
    ///
    /// Skips the dismiss phase; any pending timer for a purged toast is dropped.
    pub fn remove(&self, id: Option<ToastId>) {
        self.inner.dispatch(ToastIntent::Remove(id));
    }

    /// Applies one intent directly. Records only enter through `notify`.
    pub(crate) fn dispatch(&self, intent: ToastIntent) {
        self.inner.dispatch(intent);
    }

    /// Registers a snapshot listener.
    ///
    /// Returns an inert subscription once the center is disposed.
    pub fn subscribe(
        &self,
        listener: impl Fn(&ToastState) + Send + Sync + 'static,
    ) -> Subscription {
        let core = self.inner.lock_core();
        if core.disposed {
            debug!("event=toast_subscribe module=toast status=skipped reason=disposed");
            return Subscription::inert();
        }
        self.inner.subscribers.subscribe(listener)
    }

    /// Registers a listener and returns the state it starts from.
    ///
    /// The snapshot is taken after registration, so no dispatch falls between
    /// the returned state and the first callback.
    pub fn observe(
        &self,
        listener: impl Fn(&ToastState) + Send + Sync + 'static,
    ) -> (ToastState, Subscription) {
        let subscription = self.subscribe(listener);
        (self.snapshot(), subscription)
    }

    pub fn snapshot(&self) -> ToastState {
        self.inner.lock_core().state.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.inner.lock_core().timers.len()
    }

    pub fn has_pending_removal(&self, id: ToastId) -> bool {
        self.inner.lock_core().timers.has_pending_removal(id)
    }

    pub fn has_pending_auto_dismiss(&self, id: ToastId) -> bool {
        self.inner.lock_core().timers.has_pending_auto_dismiss(id)
    }

    /// Time until the earliest pending timer, measured on this center's clock.
    pub fn time_until_next_timer(&self) -> Option<Duration> {
        let deadline = self.inner.lock_core().timers.next_deadline()?;
        Some(deadline.saturating_duration_since(self.inner.clock.now()))
    }

    /// Fires every timer whose deadline has passed. Returns the number fired.
    pub fn fire_due_timers(&self) -> usize {
        self.inner.fire_due_timers(self.inner.clock.now())
    }

    /// Clears timers, subscribers and toasts. Later dispatches are dropped.
    pub fn dispose(&self) {
        {
            let mut core = self.inner.lock_core();
            if core.disposed {
                return;
            }
            let cancelled = core.timers.len();
            core.timers.clear();
            core.state = ToastState {
                toasts: Vec::new(),
                revision: core.state.revision + 1,
            };
            core.disposed = true;
            info!(
                "event=toast_center_dispose module=toast status=ok cancelled_timers={} subscribers={}",
                cancelled,
                self.inner.subscribers.len()
            );
        }
        self.inner.subscribers.clear();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.lock_core().disposed
    }

    pub(crate) fn downgrade(&self) -> WeakToastCenter {
        WeakToastCenter(Arc::downgrade(&self.inner))
    }
}

impl Default for ToastCenter {
    fn default() -> Self {
        Self::build(ToastConfig::default(), Arc::new(SystemClock))
    }
}

impl Debug for ToastCenter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let core = self.inner.lock_core();
        f.debug_struct("ToastCenter")
            .field("toasts", &core.state.len())
            .field("revision", &core.state.revision)
            .field("pending_timers", &core.timers.len())
            .field("disposed", &core.disposed)
            .finish()
    }
}

/// Non-owning reference used by background workers.
#[derive(Clone)]
pub(crate) struct WeakToastCenter(Weak<CenterInner>);

impl WeakToastCenter {
    pub(crate) fn upgrade(&self) -> Option<ToastCenter> {
        self.0.upgrade().map(|inner| ToastCenter { inner })
    }
}

impl CenterInner {
    fn lock_core(&self) -> MutexGuard<'_, CenterCore> {
        // Why: a panicking subscriber or caller must not wedge every later
        // dispatch; state is only replaced whole, so a poisoned guard still
        // holds a consistent snapshot.
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(&self, intent: ToastIntent) {
        {
            let mut guard = self.lock_core();
            let core = &mut *guard;
            if core.disposed {
                debug!(
                    "event={} module=toast status=skipped reason=disposed",
                    intent.name()
                );
                return;
            }
            if let ToastIntent::Add(toast) = &intent {
                if core.state.contains(toast.id) {
                    debug!(
                        "event=toast_add module=toast status=skipped reason=duplicate_id target={}",
                        toast.id
                    );
                    return;
                }
            }

            let mut next = reduce(&core.state, &intent, self.config.limit);
            next.revision = core.state.revision + 1;
            self.schedule_timers(&mut core.timers, &intent, &next);
            core.state = next;
            let dropped = core.timers.retain(|id| core.state.contains(id));

            debug!(
                "event={} module=toast status=ok target={} total={} open={} revision={} dropped_timers={}",
                intent.name(),
                intent
                    .target()
                    .map_or_else(|| "all".to_string(), |id| id.to_string()),
                core.state.len(),
                core.state.open_count(),
                core.state.revision,
                dropped
            );
            // Why: the outbox is filled under the core lock so snapshots queue
            // in revision order; delivery then runs outside it so listeners
            // may dispatch again without deadlocking.
            self.subscribers.enqueue(core.state.clone());
        }
        self.subscribers.deliver_pending();
    }

    fn schedule_timers(
        &self,
        timers: &mut TimerRegistry,
        intent: &ToastIntent,
        next: &ToastState,
    ) {
        let now = self.clock.now();
        match intent {
            ToastIntent::Add(toast) if self.config.auto_dismiss => {
                if let Some(duration_ms) = toast.duration_ms {
                    let deadline = now + Duration::from_millis(duration_ms);
                    timers.schedule_auto_dismiss(toast.id, deadline);
                }
            }
            ToastIntent::Dismiss(target) => {
                for toast in &next.toasts {
                    if target.map_or(true, |id| id == toast.id) {
                        timers.cancel_auto_dismiss(toast.id);
                        timers.schedule_removal(toast.id, now, self.config.remove_delay());
                    }
                }
            }
            _ => {}
        }
    }

    fn fire_due_timers(&self, now: Instant) -> usize {
        let due = {
            let mut core = self.lock_core();
            if core.disposed {
                return 0;
            }
            core.timers.take_due(now)
        };

        for timer in &due {
            match timer.kind {
                TimerKind::Remove => self.dispatch(ToastIntent::Remove(Some(timer.id))),
                TimerKind::AutoDismiss => {
                    let still_open = self
                        .lock_core()
                        .state
                        .get(timer.id)
                        .is_some_and(|toast| toast.open);
                    if still_open {
                        self.dispatch(ToastIntent::Dismiss(Some(timer.id)));
                    }
                }
            }
        }
        due.len()
    }
}

/// Handle returned by `ToastCenter::notify`.
///
/// Holds a weak reference; once the center is gone every call is a no-op.
#[derive(Debug, Clone)]
pub struct ToastHandle {
    id: ToastId,
    center: Weak<CenterInner>,
}

impl ToastHandle {
    pub fn id(&self) -> ToastId {
        self.id
    }

    pub fn dismiss(&self) {
        if let Some(center) = self.center.upgrade() {
            center.dispatch(ToastIntent::Dismiss(Some(self.id)));
        }
    }

    pub fn update(&self, patch: ToastPatch) {
        if let Some(center) = self.center.upgrade() {
            center.dispatch(ToastIntent::Update { id: self.id, patch });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ToastCenter;
    use crate::config::ToastConfig;
    use crate::model::toast::{Toast, ToastOptions, ToastPatch};
    use crate::store::reducer::ToastIntent;
    use crate::timer::clock::ManualClock;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn manual_center(config: ToastConfig) -> (ToastCenter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let center =
            ToastCenter::with_clock(config, clock.clone()).expect("valid config should build");
        (center, clock)
    }

    #[test]
    fn notify_fills_default_duration() {
        let (center, _) = manual_center(ToastConfig::default());
        let handle = center.notify(ToastOptions::titled("A"));
        let state = center.snapshot();
        let toast = state.get(handle.id()).expect("toast present");
        assert_eq!(toast.duration_ms, Some(4_500));
        assert!(toast.open);
    }

    #[test]
    fn every_dispatch_bumps_revision() {
        let (center, _) = manual_center(ToastConfig::default());
        let handle = center.notify(ToastOptions::titled("A"));
        handle.update(ToastPatch::default());
        handle.dismiss();
        assert_eq!(center.snapshot().revision, 3);
    }

    #[test]
    fn eviction_drops_pending_timer_of_evicted_toast() {
        let config = ToastConfig {
            limit: 2,
            ..ToastConfig::default()
        };
        let (center, _) = manual_center(config);
        let oldest = center.notify(ToastOptions::titled("1"));
        oldest.dismiss();
        assert!(center.has_pending_removal(oldest.id()));

        center.notify(ToastOptions::titled("2"));
        center.notify(ToastOptions::titled("3"));

        assert!(!center.snapshot().contains(oldest.id()));
        assert!(!center.has_pending_removal(oldest.id()));
        assert_eq!(center.pending_timers(), 0);
    }

    #[test]
    fn handle_is_noop_after_center_dropped() {
        let (center, _) = manual_center(ToastConfig::default());
        let handle = center.notify(ToastOptions::titled("A"));
        drop(center);
        handle.dismiss();
        handle.update(ToastPatch::default());
    }

    #[test]
    fn listener_may_dispatch_from_callback() {
        let (center, _) = manual_center(ToastConfig::default());
        let reentrant = center.clone();
        let dismissed = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&dismissed);
        let _subscription = center.subscribe(move |state| {
            let first_open = {
                let mut done = flag.lock().unwrap();
                let first = !*done && state.open_count() > 0;
                *done |= first;
                first
            };
            if first_open {
                reentrant.dismiss(None);
            }
        });

        center.notify(ToastOptions::titled("A"));
        assert_eq!(center.snapshot().open_count(), 0);
        assert!(*dismissed.lock().unwrap());
    }

    #[test]
    fn dispose_clears_everything_and_drops_later_dispatches() {
        let (center, clock) = manual_center(ToastConfig::default());
        let _subscription = center.subscribe(|_| {});
        let handle = center.notify(ToastOptions::titled("A"));
        handle.dismiss();

        center.dispose();
        assert!(center.is_disposed());
        assert!(center.snapshot().is_empty());
        assert_eq!(center.pending_timers(), 0);
        assert_eq!(center.subscriber_count(), 0);

        center.notify(ToastOptions::titled("B"));
        clock.advance(Duration::from_millis(5_000));
        assert_eq!(center.fire_due_timers(), 0);
        assert!(center.snapshot().is_empty());
    }

    #[test]
    fn time_until_next_timer_uses_center_clock() {
        let (center, clock) = manual_center(ToastConfig::default());
        assert_eq!(center.time_until_next_timer(), None);

        center.notify(ToastOptions::titled("A")).dismiss();
        clock.advance(Duration::from_millis(200));
        assert_eq!(
            center.time_until_next_timer(),
            Some(Duration::from_millis(1_000))
        );
    }

    #[test]
    fn add_with_existing_id_keeps_ids_unique() {
        let (center, _) = manual_center(ToastConfig {
            auto_dismiss: true,
            ..ToastConfig::default()
        });
        let handle = center.notify(ToastOptions::titled("A"));
        assert_eq!(center.pending_timers(), 1);

        let twin = Toast::with_id(handle.id(), ToastOptions::titled("A again"));
        center.dispatch(ToastIntent::Add(twin));

        let state = center.snapshot();
        assert_eq!(state.len(), 1);
        assert_eq!(state.revision, 1);
        assert_eq!(center.pending_timers(), 1);
        assert_eq!(
            state.get(handle.id()).and_then(|t| t.title.as_deref()),
            Some("A")
        );

        handle.dismiss();
        assert_eq!(center.pending_timers(), 1);
    }

    #[test]
    fn subscribe_after_dispose_is_inert() {
        let (center, _) = manual_center(ToastConfig::default());
        center.dispose();

        let subscription = center.subscribe(|_| panic!("disposed center must not deliver"));
        assert!(!subscription.is_active());
        assert_eq!(center.subscriber_count(), 0);
        center.notify(ToastOptions::titled("A"));
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = ToastConfig {
            limit: 0,
            ..ToastConfig::default()
        };
        assert!(ToastCenter::new(config).is_err());
    }
}
