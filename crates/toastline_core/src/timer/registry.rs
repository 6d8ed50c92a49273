//! Deferred per-toast timers.
//!
//! # Invariants
//! - At most one pending removal timer per toast id.
//! - At most one pending auto-dismiss timer per toast id.
//! - A timer leaves the registry when it is taken as due, cancelled or cleared.

use crate::model::toast::ToastId;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimerKind {
    /// Purge the toast from the store.
    Remove,
    /// Begin dismissal of a still-open toast.
    AutoDismiss,
}

/// One timer taken out of the registry because its deadline passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueTimer {
    pub id: ToastId,
    pub kind: TimerKind,
    pub deadline: Instant,
}

/// Pending timers keyed by toast id.
#[derive(Debug, Default)]
pub struct TimerRegistry {
    removals: BTreeMap<ToastId, Instant>,
    expiries: BTreeMap<ToastId, Instant>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules removal of `id` at `now + delay`.
    ///
    /// Returns `false` without touching the existing deadline when a removal
    /// for `id` is already pending.
    pub fn schedule_removal(&mut self, id: ToastId, now: Instant, delay: Duration) -> bool {
        if self.removals.contains_key(&id) {
            return false;
        }
        self.removals.insert(id, now + delay);
        true
    }

    /// Schedules auto-dismiss of `id` at `deadline`. Same no-op rule as removal.
    pub fn schedule_auto_dismiss(&mut self, id: ToastId, deadline: Instant) -> bool {
        if self.expiries.contains_key(&id) {
            return false;
        }
        self.expiries.insert(id, deadline);
        true
    }

    pub fn has_pending_removal(&self, id: ToastId) -> bool {
        self.removals.contains_key(&id)
    }

    pub fn has_pending_auto_dismiss(&self, id: ToastId) -> bool {
        self.expiries.contains_key(&id)
    }

    /// Total pending timers of both kinds.
    pub fn len(&self) -> usize {
        self.removals.len() + self.expiries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.expiries.is_empty()
    }

    /// Drops every timer for `id`. Returns whether anything was pending.
    pub fn cancel(&mut self, id: ToastId) -> bool {
        let removal = self.removals.remove(&id).is_some();
        let expiry = self.expiries.remove(&id).is_some();
        removal || expiry
    }

    pub fn cancel_auto_dismiss(&mut self, id: ToastId) -> bool {
        self.expiries.remove(&id).is_some()
    }

    /// Keeps only timers whose id satisfies `keep`. Returns the dropped count.
    pub fn retain(&mut self, mut keep: impl FnMut(ToastId) -> bool) -> usize {
        let before = self.len();
        self.removals.retain(|id, _| keep(*id));
        self.expiries.retain(|id, _| keep(*id));
        before - self.len()
    }

    pub fn clear(&mut self) {
        self.removals.clear();
        self.expiries.clear();
    }

    /// Earliest pending deadline of either kind.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.removals
            .values()
            .chain(self.expiries.values())
            .min()
            .copied()
    }

    /// Removes and returns every timer with `deadline <= now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<DueTimer> {
        let mut due = Vec::new();
        drain_due(&mut self.removals, now, TimerKind::Remove, &mut due);
        drain_due(&mut self.expiries, now, TimerKind::AutoDismiss, &mut due);
        due.sort_by_key(|timer| (timer.deadline, timer.kind));
        due
    }
}

fn drain_due(
    timers: &mut BTreeMap<ToastId, Instant>,
    now: Instant,
    kind: TimerKind,
    out: &mut Vec<DueTimer>,
) {
    timers.retain(|id, deadline| {
        if *deadline <= now {
            out.push(DueTimer {
                id: *id,
                kind,
                deadline: *deadline,
            });
            false
        } else {
            true
        }
    });
}
