//! Background thread that fires a center's due timers.
//!
//! # Invariants
//! - The pump never keeps its center alive; it exits once the center is
//!   dropped or disposed.
//! - `stop` (or drop) returns only after the worker thread has exited.

use crate::service::toast_center::{ToastCenter, WeakToastCenter};
use log::{error, info};
use std::io;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const PUMP_THREAD_NAME: &str = "toastline-timer-pump";

#[derive(Default)]
struct PumpSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

/// Running timer pump. Stops on drop.
pub struct TimerPump {
    signal: Arc<PumpSignal>,
    worker: Option<JoinHandle<()>>,
}

impl TimerPump {
    /// Spawns a pump for `center`, polling at most every `pump_interval_ms`.
    pub fn spawn(center: &ToastCenter) -> io::Result<Self> {
        let weak = center.downgrade();
        let interval = center.config().pump_interval();
        let signal = Arc::new(PumpSignal::default());
        let worker_signal = Arc::clone(&signal);

        let worker = thread::Builder::new()
            .name(PUMP_THREAD_NAME.to_string())
            .spawn(move || run(weak, interval, worker_signal))?;

        info!(
            "event=timer_pump_start module=toast status=ok interval_ms={}",
            interval.as_millis()
        );
        Ok(Self {
            signal,
            worker: Some(worker),
        })
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.is_finished())
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        *self
            .signal
            .stopped
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = true;
        self.signal.wake.notify_all();
        if worker.join().is_err() {
            error!("event=timer_pump_stop module=toast status=error reason=worker_panicked");
            return;
        }
        info!("event=timer_pump_stop module=toast status=ok");
    }
}

impl Drop for TimerPump {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(center: WeakToastCenter, interval: Duration, signal: Arc<PumpSignal>) {
    loop {
        // Why: the strong reference is dropped before sleeping, otherwise the
        // pump would keep a center alive after its last owner is gone.
        let wait = {
            let Some(center) = center.upgrade() else {
                break;
            };
            if center.is_disposed() {
                break;
            }
            center.fire_due_timers();
            center
                .time_until_next_timer()
                .map_or(interval, |until| until.min(interval))
        };

        let stopped = signal
            .stopped
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (stopped, _) = signal
            .wake
            .wait_timeout_while(stopped, wait, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        if *stopped {
            break;
        }
    }
}
