// tests/debounce_coalescing.rs

mod common;
use crate::common::init_tracing;

use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

use hotbuild::engine::{RuntimeEvent, TriggerReason};
use hotbuild::watch::{Debouncer, EventFilter, IgnoreRules};

const QUIET: Duration = Duration::from_millis(1500);

fn debouncer() -> (Debouncer, mpsc::Receiver<RuntimeEvent>) {
    let (tx, rx) = mpsc::channel(16);
    let ignore = IgnoreRules::new(["vendor", "*.pb.go"]).unwrap();
    let filter = EventFilter::new("/proj", ignore, vec!["go".to_string()]);
    (Debouncer::new(filter, QUIET, tx), rx)
}

#[tokio::test(start_paused = true)]
async fn burst_of_changes_yields_one_cycle_after_quiet_interval() {
    init_tracing();
    let (debouncer, mut rx) = debouncer();
    let start = Instant::now();

    assert!(debouncer.on_event(Path::new("/proj/main.go")));
    for name in ["a.go", "b.go", "internal/c.go", "main.go"] {
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!debouncer.on_event(&Path::new("/proj").join(name)));
    }

    let Some(RuntimeEvent::CycleDue { trigger, guard }) = rx.recv().await else {
        panic!("expected CycleDue");
    };
    assert!(start.elapsed() >= QUIET);
    assert_eq!(
        trigger,
        TriggerReason::FileChange(PathBuf::from("/proj/main.go"))
    );

    // Nothing else queued, even well past another quiet interval.
    tokio::time::sleep(QUIET * 3).await;
    assert!(rx.try_recv().is_err());
    drop(guard);
}

#[tokio::test(start_paused = true)]
async fn flag_stays_set_until_the_cycle_guard_is_dropped() {
    init_tracing();
    let (debouncer, mut rx) = debouncer();

    assert!(debouncer.on_event(Path::new("/proj/main.go")));
    let Some(RuntimeEvent::CycleDue { guard, .. }) = rx.recv().await else {
        panic!("expected CycleDue");
    };

    // Cycle "in flight": changes are dropped.
    assert!(debouncer.is_pending());
    assert!(!debouncer.on_event(Path::new("/proj/main.go")));

    drop(guard);
    assert!(!debouncer.is_pending());

    assert!(debouncer.on_event(Path::new("/proj/other.go")));
    let Some(RuntimeEvent::CycleDue { trigger, .. }) = rx.recv().await else {
        panic!("expected a second CycleDue");
    };
    assert_eq!(
        trigger,
        TriggerReason::FileChange(PathBuf::from("/proj/other.go"))
    );
}

#[tokio::test(start_paused = true)]
async fn irrelevant_paths_never_claim_the_flag() {
    init_tracing();
    let (debouncer, mut rx) = debouncer();

    assert!(!debouncer.on_event(Path::new("/proj/README.md")));
    assert!(!debouncer.on_event(Path::new("/proj/api/user.pb.go")));
    assert!(!debouncer.on_event(Path::new("/proj/vendor/lib/lib.go")));
    assert!(!debouncer.is_pending());

    tokio::time::sleep(QUIET * 2).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn startup_schedule_is_immediate_and_shares_the_flag() {
    init_tracing();
    let (debouncer, mut rx) = debouncer();
    let start = Instant::now();

    assert!(debouncer.schedule(TriggerReason::Startup, Duration::ZERO));
    assert!(!debouncer.on_event(Path::new("/proj/main.go")));

    let Some(RuntimeEvent::CycleDue { trigger, guard }) = rx.recv().await else {
        panic!("expected CycleDue");
    };
    assert_eq!(trigger, TriggerReason::Startup);
    assert!(start.elapsed() < QUIET);
    drop(guard);
}

#[tokio::test(start_paused = true)]
async fn dropped_runtime_releases_the_flag() {
    init_tracing();
    let (debouncer, rx) = debouncer();
    drop(rx);

    assert!(debouncer.on_event(Path::new("/proj/main.go")));
    tokio::time::sleep(QUIET * 2).await;

    // The undelivered event (and its guard) was dropped with the send error.
    assert!(!debouncer.is_pending());
}
