//! Pure toast state transitions.
//!
//! # Invariants
//! - `reduce` performs no side effects; timer scheduling lives in the center.
//! - The result never holds more than `limit` toasts.
//! - Unknown ids are ignored by every intent.
//! - Adding an id that is already present leaves the state unchanged.

use crate::model::toast::{Toast, ToastId, ToastPatch};
use serde::{Deserialize, Serialize};

/// Store snapshot handed to subscribers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastState {
    /// Active toasts, newest first.
    pub toasts: Vec<Toast>,
    /// Dispatch counter. Bumped once per dispatch by the owning center.
    pub revision: u64,
}

impl ToastState {
    pub fn get(&self, id: ToastId) -> Option<&Toast> {
        self.toasts.iter().find(|toast| toast.id == id)
    }

    pub fn contains(&self, id: ToastId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    /// Number of toasts not yet dismissed.
    pub fn open_count(&self) -> usize {
        self.toasts.iter().filter(|toast| toast.open).count()
    }
}

/// One state transition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToastIntent {
    Add(Toast),
    Update { id: ToastId, patch: ToastPatch },
    /// `None` dismisses every toast.
    Dismiss(Option<ToastId>),
    /// `None` removes every toast.
    Remove(Option<ToastId>),
}

impl ToastIntent {
    /// Stable name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add(_) => "toast_add",
            Self::Update { .. } => "toast_update",
            Self::Dismiss(_) => "toast_dismiss",
            Self::Remove(_) => "toast_remove",
        }
    }

    /// Target id, if the intent addresses a single toast.
    pub fn target(&self) -> Option<ToastId> {
        match self {
            Self::Add(toast) => Some(toast.id),
            Self::Update { id, .. } => Some(*id),
            Self::Dismiss(id) | Self::Remove(id) => *id,
        }
    }
}

/// Applies one intent and returns the next state.
///
/// `revision` is carried over unchanged.
pub fn reduce(state: &ToastState, intent: &ToastIntent, limit: usize) -> ToastState {
    let toasts = match intent {
        ToastIntent::Add(toast) if state.contains(toast.id) => state.toasts.clone(),
        ToastIntent::Add(toast) => std::iter::once(toast.clone())
            .chain(state.toasts.iter().cloned())
            .take(limit)
            .collect(),
        ToastIntent::Update { id, patch } => state
            .toasts
            .iter()
            .map(|toast| {
                let mut next = toast.clone();
                if next.id == *id {
                    next.apply_patch(patch);
                }
                next
            })
            .collect(),
        ToastIntent::Dismiss(target) => state
            .toasts
            .iter()
            .map(|toast| {
                let mut next = toast.clone();
                if target.map_or(true, |id| id == toast.id) {
                    next.open = false;
                }
                next
            })
            .collect(),
        ToastIntent::Remove(Some(id)) => state
            .toasts
            .iter()
            .filter(|toast| toast.id != *id)
            .cloned()
            .collect(),
        ToastIntent::Remove(None) => Vec::new(),
    };

    ToastState {
        toasts,
        revision: state.revision,
    }
}
