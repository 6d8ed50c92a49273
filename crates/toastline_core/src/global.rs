//! Process-wide default toast center.
//!
//! # Responsibility
//! - Lazily build one center from `TOASTLINE_*` environment settings.
//! - Offer free functions for callers that do not carry a center around.
//!
//! # Invariants
//! - The default center is built at most once per process.
//! - At most one timer pump runs for the default center.
//! - Disposing the default center is permanent for the process.

use crate::config::ToastConfig;
use crate::model::toast::{ToastId, ToastOptions};
use crate::service::timer_pump::TimerPump;
use crate::service::toast_center::{ToastCenter, ToastHandle};
use crate::store::reducer::ToastState;
use crate::subscription::Subscription;
use log::warn;
use once_cell::sync::{Lazy, OnceCell};

static DEFAULT_CENTER: Lazy<ToastCenter> = Lazy::new(|| match ToastConfig::from_env() {
    Ok(config) => ToastCenter::new(config).unwrap_or_default(),
    Err(err) => {
        warn!(
            "event=toast_config_load module=toast status=fallback reason=\"{}\"",
            err
        );
        ToastCenter::default()
    }
});

static DEFAULT_PUMP: OnceCell<TimerPump> = OnceCell::new();

/// Returns the process-wide center, building it on first use.
pub fn default_center() -> &'static ToastCenter {
    &DEFAULT_CENTER
}

/// Creates a toast on the default center.
pub fn toast(options: ToastOptions) -> ToastHandle {
    default_center().notify(options)
}

/// Begins dismissal on the default center.
pub fn dismiss(id: Option<ToastId>) {
    default_center().dismiss(id);
}

/// Subscribes to the default center.
pub fn subscribe(listener: impl Fn(&ToastState) + Send + Sync + 'static) -> Subscription {
    default_center().subscribe(listener)
}

/// Starts the default center's timer pump once; later calls are no-ops.
pub fn ensure_timer_pump() -> Result<(), String> {
    DEFAULT_PUMP
        .get_or_try_init(|| TimerPump::spawn(default_center()))
        .map(|_| ())
        .map_err(|err| format!("failed to start timer pump: {err}"))
}
