//! Batch runners driven end to end: ordering, bounding and failure capture.

use std::time::Duration;

use timeable_core::{Batch, concurrent, consecutive, outcome, parallel, sequential};
use timeable_types::{ExecutorFault, Settled};
use timeable_utils::{append, chunk, concurrency_from};
use tokio::time::Instant;

use crate::common::{InFlight, TestError, delayed, rejected};

fn item(batch: Batch<'_, u64>) -> u64 {
    batch.item().copied().unwrap_or_default()
}

#[tokio::test(start_paused = true)]
async fn parallel_keeps_initiation_order_not_completion_order() {
    let started = Instant::now();
    let settled = parallel(&[30, 10, 20], 0, |batch, _| delayed(item(batch), item(batch))).await;

    let values: Vec<_> = settled.iter().filter_map(Settled::value).copied().collect();
    assert_eq!(values, [30, 10, 20]);
    assert!(started.elapsed() < Duration::from_millis(40));
}

#[tokio::test(start_paused = true)]
async fn sequential_runs_one_at_a_time() {
    let tracker = InFlight::default();
    let started = Instant::now();
    let settled = sequential(&[30, 10, 20], 0, |batch, _, _: &[Settled<_, _>]| {
        let guard = tracker.enter();
        async move {
            let value = delayed(item(batch), item(batch)).await;
            drop(guard);
            value
        }
    })
    .await;

    assert_eq!(settled.len(), 3);
    assert!(settled.iter().all(Settled::is_fulfilled));
    assert_eq!(tracker.peak(), 1);
    assert!(started.elapsed() >= Duration::from_millis(60));
}

#[tokio::test(start_paused = true)]
async fn parallel_with_concurrency_bounds_chunks_in_flight() {
    let tracker = InFlight::default();
    let settled = parallel(&[1_u64, 2, 3, 4, 5], 2, |batch, _| {
        let guard = tracker.enter();
        let sum: u64 = batch.as_slice().iter().sum();
        async move {
            let value = delayed(sum, 10).await;
            drop(guard);
            value
        }
    })
    .await;

    assert_eq!(
        settled,
        vec![
            Settled::fulfilled(3),
            Settled::fulfilled(7),
            Settled::fulfilled(5)
        ]
    );
    assert_eq!(tracker.peak(), 2);
}

#[tokio::test]
async fn rejections_and_panics_become_outcomes() {
    let settled = concurrent(&[1_u64, 2, 3], 0, |batch, _| {
        let n = item(batch);
        async move {
            match n {
                2 => Err(rejected("two")),
                3 => panic!("boom at three"),
                _ => Ok(n),
            }
        }
    })
    .await;

    assert_eq!(settled.len(), 3);
    assert_eq!(settled[0], Settled::fulfilled(1));
    assert_eq!(settled[1], Settled::rejected(rejected("two")));
    assert!(matches!(
        settled[2].reason(),
        Some(TestError::Fault(ExecutorFault::Panicked { message })) if message.contains("boom")
    ));
}

#[tokio::test]
async fn consecutive_lends_prior_outcomes() {
    let mut seen = Vec::new();
    let settled = consecutive(&["x", "y", "z"], 0, |batch, index, so_far: &[Settled<usize, TestError>]| {
        seen.push((index, so_far.len()));
        let len = batch.as_slice().len();
        async move { Ok(len) }
    })
    .await;

    assert_eq!(settled.len(), 3);
    assert_eq!(seen, [(0, 0), (1, 1), (2, 2)]);
}

#[tokio::test]
async fn outcome_never_fails() {
    let ok = outcome(|| async { Ok::<_, TestError>("done") }).await;
    let err = outcome(|| async { Err::<&str, _>(TestError::TimedOut) }).await;

    assert_eq!(ok, Settled::fulfilled("done"));
    assert_eq!(err, Settled::rejected(TestError::TimedOut));
}

#[tokio::test]
async fn outcomes_serialize_in_status_shape() {
    let settled = concurrent(&[1_u64, 2], 0, |batch, _| {
        let n = item(batch);
        async move {
            if n == 1 { Ok(n) } else { Err(rejected("even")) }
        }
    })
    .await;
    let described: Vec<Settled<u64, String>> = settled
        .into_iter()
        .map(|settled| settled.map_reason(|err| err.to_string()))
        .collect();

    assert_eq!(
        serde_json::to_value(&described).unwrap(),
        serde_json::json!([
            { "status": "fulfilled", "value": 1 },
            { "status": "rejected", "reason": "rejected: even" }
        ])
    );
}

#[tokio::test]
async fn loose_concurrency_drives_chunking() {
    let items = [1, 2, 3, 4, 5, 6, 7];
    let loose = serde_json::json!("3");
    let groups = chunk(&items, concurrency_from(&loose));
    assert_eq!(groups.len(), 3);

    let mut flattened = Vec::new();
    for group in groups.groups().unwrap_or(&[]) {
        append(&mut flattened, group.iter().copied());
    }
    assert_eq!(flattened, items);

    let unset = serde_json::json!(null);
    assert!(!chunk(&items, concurrency_from(&unset)).is_grouped());
}
