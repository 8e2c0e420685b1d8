//! Consecutive batch runners: strict turn-taking, one invocation at a time.

use std::future::Future;

use timeable_types::{Batch, ExecutorFault, Settled};
use timeable_utils::{append, chunk};

use crate::outcome::outcome;

/// Runs `executor` over every item, or every chunk of `concurrency` items
/// when `concurrency > 0`, one invocation at a time.
///
/// Each invocation receives the batch, the position of its first item in
/// `items`, and the outcomes recorded so far; the next invocation starts only after the previous outcome has been
/// recorded. The accumulator is lent while the executor builds its future, so
/// anything it needs from earlier outcomes must be read before the future is
/// returned.
pub async fn consecutive<'a, T, V, E, F, Fut>(
    items: &'a [T],
    concurrency: usize,
    mut executor: F,
) -> Vec<Settled<V, E>>
where
    F: FnMut(Batch<'a, T>, usize, &[Settled<V, E>]) -> Fut,
    Fut: Future<Output = Result<V, E>>,
    E: From<ExecutorFault>,
{
    let stride = concurrency.max(1);
    run_consecutively(chunk(items, concurrency).batches(), stride, &mut executor).await
}

/// Runs [`consecutive`] across groups, strictly one run after another.
///
/// Grouping matches [`concurrents`](crate::concurrents): with
/// `concurrency > 0` each run is `concurrency` groups handed out as
/// [`Batch::Chunk`]s, with 0 each group is a run whose members are handed out
/// as [`Batch::Item`]s. Every run starts with an empty accumulator.
pub async fn consecutives<'a, T: 'a, G, V, E, F, Fut>(
    groups: &'a [G],
    concurrency: usize,
    mut executor: F,
) -> Vec<Settled<V, E>>
where
    G: AsRef<[T]>,
    F: FnMut(Batch<'a, T>, usize, &[Settled<V, E>]) -> Fut,
    Fut: Future<Output = Result<V, E>>,
    E: From<ExecutorFault>,
{
    let views: Vec<&'a [T]> = groups.iter().map(<G as AsRef<[T]>>::as_ref).collect();
    consecutive_runs(&views, concurrency, &mut executor).await
}

pub(crate) async fn consecutive_runs<'a, T, V, E, F, Fut>(
    groups: &[&'a [T]],
    concurrency: usize,
    executor: &mut F,
) -> Vec<Settled<V, E>>
where
    F: FnMut(Batch<'a, T>, usize, &[Settled<V, E>]) -> Fut,
    Fut: Future<Output = Result<V, E>>,
    E: From<ExecutorFault>,
{
    let mut settled = Vec::new();

    if concurrency > 0 {
        for run in groups.chunks(concurrency) {
            let batches = run.iter().map(|&group| Batch::Chunk(group)).collect();
            append(&mut settled, run_consecutively(batches, 1, executor).await);
        }
    } else {
        for &group in groups {
            let batches = group.iter().map(Batch::Item).collect();
            append(&mut settled, run_consecutively(batches, 1, executor).await);
        }
    }

    settled
}

/// Invocation `n` is handed index `n * stride`.
pub(crate) async fn run_consecutively<'a, T, V, E, F, Fut>(
    batches: Vec<Batch<'a, T>>,
    stride: usize,
    executor: &mut F,
) -> Vec<Settled<V, E>>
where
    F: FnMut(Batch<'a, T>, usize, &[Settled<V, E>]) -> Fut,
    Fut: Future<Output = Result<V, E>>,
    E: From<ExecutorFault>,
{
    let mut settled = Vec::with_capacity(batches.len());
    for (ordinal, batch) in batches.into_iter().enumerate() {
        let index = ordinal * stride;
        let next = outcome(|| executor(batch, index, &settled)).await;
        settled.push(next);
    }
    settled
}
