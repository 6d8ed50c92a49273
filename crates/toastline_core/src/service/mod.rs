//! Toast use-case services.
//!
//! # Responsibility
//! - Expose the public entry points over the store, timers and subscribers.
//! - Keep rendering layers decoupled from dispatch details.

pub mod timer_pump;
pub mod toast_center;
