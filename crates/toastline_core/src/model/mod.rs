//! Toast domain model.
//!
//! # Responsibility
//! - Define the record shape shared by the store, timers and consumers.
//!
//! # Invariants
//! - Every toast is identified by a stable `ToastId`.
//! - Records are only mutated through store dispatch.

pub mod toast;
