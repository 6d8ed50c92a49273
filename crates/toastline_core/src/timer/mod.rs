//! Timer registry and clock abstraction.
//!
//! Timers are plain deadlines; nothing here sleeps. The owning center fires
//! due timers when polled, either by a caller or by a `TimerPump`.

pub mod clock;
pub mod registry;
