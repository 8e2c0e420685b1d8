//! Deadline races, polling and waiting working together on a paused clock.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use timeable_config::TimeableConfig;
use timeable_core::{Settle, poll, poll_with, sleep, until_settled_or_timed_out, wait_for};
use tokio::time::Instant;

use crate::common::TestError;

#[tokio::test(start_paused = true)]
async fn late_executor_observes_expiry_and_loses() {
    let saw_pending = Arc::new(AtomicBool::new(true));
    let won_late = Arc::new(AtomicBool::new(true));
    let (pending_flag, won_flag) = (Arc::clone(&saw_pending), Arc::clone(&won_late));

    let result = until_settled_or_timed_out(
        move |settle: Settle<u32, TestError>, pending| async move {
            sleep(Duration::from_millis(50)).await;
            pending_flag.store(pending.is_pending(), Ordering::SeqCst);
            won_flag.store(settle.resolve(7), Ordering::SeqCst);
        },
        |settle| {
            settle.reject(TestError::TimedOut);
        },
        Duration::from_millis(20),
    )
    .await;
    assert_eq!(result, Err(TestError::TimedOut));

    // The executor is not preempted; let it finish.
    sleep(Duration::from_millis(40)).await;
    assert!(!saw_pending.load(Ordering::SeqCst));
    assert!(!won_late.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn settling_early_cancels_the_timeout_executor() {
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);

    let result = until_settled_or_timed_out(
        |settle: Settle<&str, TestError>, _| async move {
            sleep(Duration::from_millis(5)).await;
            settle.resolve("early");
        },
        move |settle| {
            counter.fetch_add(1, Ordering::SeqCst);
            settle.reject(TestError::TimedOut);
        },
        Duration::from_millis(30),
    )
    .await;
    assert_eq!(result, Ok("early"));

    sleep(Duration::from_millis(100)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn wait_for_tracks_a_poller() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let poller = poll(Duration::from_millis(10), false, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        async {}
    });

    let started = Instant::now();
    let observed = Arc::clone(&runs);
    wait_for(
        move || observed.load(Ordering::SeqCst) >= 3,
        Duration::from_secs(1),
        Duration::from_millis(5),
    )
    .await;
    let elapsed = started.elapsed();
    drop(poller);

    assert!(elapsed >= Duration::from_millis(30), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(40), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn wait_for_gives_up_quietly_at_the_deadline() {
    let started = Instant::now();
    wait_for(|| false, Duration::from_millis(25), Duration::from_millis(10)).await;
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(25));
    assert!(elapsed < Duration::from_millis(30));
}

#[tokio::test(start_paused = true)]
async fn configured_poll_runs_immediately_then_on_interval() {
    let config = TimeableConfig::parse("[poll]\ninterval_ms = 20\nimmediately = true\n").unwrap();
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let poller = poll_with(config.poll_options(), move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        async {}
    });

    sleep(Duration::from_millis(15)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    sleep(Duration::from_millis(30)).await;
    poller.stop();
    assert_eq!(runs.load(Ordering::SeqCst), 3);
    assert!(poller.is_stopped());
}

#[tokio::test(start_paused = true)]
async fn stopping_before_the_immediate_run_cancels_it() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let poller = poll(Duration::from_millis(100), true, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        async {}
    });
    sleep(Duration::from_millis(5)).await;
    poller.stop();

    sleep(Duration::from_millis(300)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}
