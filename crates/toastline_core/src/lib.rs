//! Core transient notification (toast) manager for toastline.
//! This crate is the single source of truth for toast lifecycle invariants.

pub mod config;
pub mod global;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;
pub mod subscription;
pub mod timer;

pub use config::{ConfigError, ToastConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::toast::{
    Toast, ToastAction, ToastId, ToastOptions, ToastPatch, ToastVariant, ToastVariantError,
};
pub use service::timer_pump::TimerPump;
pub use service::toast_center::{ToastCenter, ToastHandle};
pub use store::reducer::{reduce, ToastIntent, ToastState};
pub use subscription::Subscription;
pub use timer::clock::{Clock, ManualClock, SystemClock};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
