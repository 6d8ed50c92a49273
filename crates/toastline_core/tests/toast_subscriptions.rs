use std::sync::{Arc, Mutex};
use std::time::Duration;
use toastline_core::{ManualClock, ToastCenter, ToastConfig, ToastOptions, ToastState};

fn center() -> (ToastCenter, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let center = ToastCenter::with_clock(ToastConfig::default(), clock.clone()).unwrap();
    (center, clock)
}

fn recorder() -> (
    Arc<Mutex<Vec<ToastState>>>,
    impl Fn(&ToastState) + Send + Sync + 'static,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, move |state: &ToastState| {
        sink.lock().unwrap().push(state.clone())
    })
}

#[test]
fn every_dispatch_reaches_subscribers_in_order() {
    let (center, clock) = center();
    let (seen, listener) = recorder();
    let _subscription = center.subscribe(listener);

    let handle = center.notify(ToastOptions::titled("A"));
    handle.dismiss();
    clock.advance(Duration::from_millis(1_200));
    center.fire_due_timers();

    let seen = seen.lock().unwrap();
    let revisions: Vec<u64> = seen.iter().map(|state| state.revision).collect();
    assert_eq!(revisions, vec![1, 2, 3]);
    assert!(seen[0].toasts[0].open);
    assert!(!seen[1].toasts[0].open);
    assert!(seen[2].is_empty());
}

#[test]
fn subscribers_are_called_in_subscription_order() {
    let (center, _) = center();
    let order = Arc::new(Mutex::new(Vec::new()));

    let subscriptions: Vec<_> = ["first", "second", "third"]
        .into_iter()
        .map(|name| {
            let order = Arc::clone(&order);
            center.subscribe(move |_| order.lock().unwrap().push(name))
        })
        .collect();

    center.notify(ToastOptions::titled("A"));
    assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    assert_eq!(center.subscriber_count(), subscriptions.len());
}

#[test]
fn dropped_subscription_receives_nothing_more() {
    let (center, _) = center();
    let (seen, listener) = recorder();
    let subscription = center.subscribe(listener);

    center.notify(ToastOptions::titled("A"));
    drop(subscription);
    center.notify(ToastOptions::titled("B"));

    assert_eq!(seen.lock().unwrap().len(), 1);
    assert_eq!(center.subscriber_count(), 0);
}

#[test]
fn observe_returns_current_state_and_follows_changes() {
    let (center, _) = center();
    center.notify(ToastOptions::titled("A"));

    let (seen, listener) = recorder();
    let (initial, _subscription) = center.observe(listener);
    assert_eq!(initial.len(), 1);
    assert_eq!(initial.revision, 1);

    center.notify(ToastOptions::titled("B"));
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].revision, initial.revision + 1);
}

#[test]
fn isolated_centers_do_not_share_state() {
    let (left, _) = center();
    let (right, _) = center();
    let (seen, listener) = recorder();
    let _subscription = right.subscribe(listener);

    left.notify(ToastOptions::titled("A"));
    assert_eq!(left.snapshot().len(), 1);
    assert!(right.snapshot().is_empty());
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn concurrent_notify_keeps_bound_and_unique_revisions() {
    let (center, _) = center();
    let (seen, listener) = recorder();
    let _subscription = center.subscribe(listener);

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let center = center.clone();
            std::thread::spawn(move || {
                for n in 0..25 {
                    center.notify(ToastOptions::titled(format!("{worker}-{n}")));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let state = center.snapshot();
    assert_eq!(state.len(), 5);
    assert_eq!(state.revision, 100);

    let mut revisions: Vec<u64> = seen.lock().unwrap().iter().map(|s| s.revision).collect();
    revisions.sort_unstable();
    revisions.dedup();
    assert_eq!(revisions.len(), 100);
    assert!(seen.lock().unwrap().iter().all(|s| s.len() <= 5));
}

#[test]
fn concurrent_dispatch_delivers_revisions_in_order() {
    let (center, _) = center();
    let revisions = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&revisions);
    let _subscription = center.subscribe(move |state| sink.lock().unwrap().push(state.revision));

    let workers: Vec<_> = (0..8)
        .map(|worker| {
            let center = center.clone();
            std::thread::spawn(move || {
                for n in 0..500 {
                    let handle = center.notify(ToastOptions::titled(format!("{worker}-{n}")));
                    if n % 3 == 0 {
                        handle.dismiss();
                    }
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let revisions = revisions.lock().unwrap();
    let expected = center.snapshot().revision;
    assert_eq!(revisions.len() as u64, expected);
    assert!(
        revisions.windows(2).all(|pair| pair[0] < pair[1]),
        "revisions were delivered out of order"
    );
}
