//! Notification store.
//!
//! # Responsibility
//! - Own the authoritative toast list shape and its pure reducer.
//!
//! # Invariants
//! - State changes only through `reduce`.
//! - Toast ids in one state are unique.

pub mod reducer;
