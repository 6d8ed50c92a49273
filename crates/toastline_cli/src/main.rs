//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `toastline_core` linkage.
//! - Walk one toast through notify, dismiss and removal on a manual clock,
//!   printing every snapshot a subscriber receives.
//! - Keep output deterministic (titles only, no ids or wall-clock times).

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use toastline_core::{
    ManualClock, ToastCenter, ToastConfig, ToastOptions, ToastState, ToastVariant,
};

fn main() -> ExitCode {
    println!("toastline_core ping={}", toastline_core::ping());
    println!("toastline_core version={}", toastline_core::core_version());

    let config = match ToastConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    let clock = Arc::new(ManualClock::new());
    let center = match ToastCenter::with_clock(config.clone(), clock.clone()) {
        Ok(center) => center,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    let _subscription = center.subscribe(print_snapshot);

    center.notify(
        ToastOptions::titled("Signed in")
            .description("Redirecting to your dashboard")
            .variant(ToastVariant::Success),
    );
    let failed = center.notify(
        ToastOptions::titled("Invalid credentials").variant(ToastVariant::Destructive),
    );
    failed.dismiss();

    clock.advance(config.remove_delay());
    let fired = center.fire_due_timers();
    println!("fired={fired} after_ms={}", clock.elapsed().as_millis());

    center.dismiss(None);
    clock.advance(config.remove_delay() + Duration::from_millis(1));
    let fired = center.fire_due_timers();
    println!("fired={fired} after_ms={}", clock.elapsed().as_millis());

    center.dispose();
    ExitCode::SUCCESS
}

fn print_snapshot(state: &ToastState) {
    let toasts: Vec<String> = state
        .toasts
        .iter()
        .map(|toast| {
            format!(
                "{}({}{})",
                toast.title.as_deref().unwrap_or("-"),
                toast.variant,
                if toast.open { "" } else { ",closed" }
            )
        })
        .collect();
    println!("revision={} toasts=[{}]", state.revision, toasts.join(", "));
}
