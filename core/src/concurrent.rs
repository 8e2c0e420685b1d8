//! Concurrent batch runners: every invocation of a run starts before any is awaited.

use std::future::Future;

use futures_util::future::join_all;
use timeable_types::{Batch, ExecutorFault, Settled};
use timeable_utils::{append, chunk};

use crate::outcome::outcome;

/// Runs `executor` over every item, or over every chunk of `concurrency`
/// items when `concurrency > 0`, all at once.
///
/// Outcomes come back in initiation order regardless of completion order,
/// one per invocation. Failures are captured as `Rejected`; the call itself
/// never fails. The executor receives the batch and its position.
///
/// ```
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// use timeable_core::concurrent;
/// use timeable_types::{ExecutorFault, Settled};
///
/// let settled = concurrent(&[1, 2, 3, 4, 5], 2, |batch, _| async move {
///     Ok::<_, ExecutorFault>(batch.as_slice().iter().map(|x| x * 2).collect::<Vec<_>>())
/// })
/// .await;
/// assert_eq!(settled[0], Settled::fulfilled(vec![2, 4]));
/// assert_eq!(settled[2], Settled::fulfilled(vec![10]));
/// # });
/// ```
pub async fn concurrent<'a, T, V, E, F, Fut>(
    items: &'a [T],
    concurrency: usize,
    executor: F,
) -> Vec<Settled<V, E>>
where
    F: Fn(Batch<'a, T>, usize) -> Fut,
    Fut: Future<Output = Result<V, E>>,
    E: From<ExecutorFault>,
{
    run_concurrently(chunk(items, concurrency).batches(), &executor).await
}

/// Runs [`concurrent`] across groups, one run after another.
///
/// With `concurrency > 0`, the groups are taken `concurrency` at a time and
/// the executor receives each group of a run as a [`Batch::Chunk`]. With 0,
/// each group is a run of its own and the executor receives its members as
/// [`Batch::Item`]s. A run finishes before the next one starts; outcomes are
/// appended in run order.
pub async fn concurrents<'a, T: 'a, G, V, E, F, Fut>(
    groups: &'a [G],
    concurrency: usize,
    executor: F,
) -> Vec<Settled<V, E>>
where
    G: AsRef<[T]>,
    F: Fn(Batch<'a, T>, usize) -> Fut,
    Fut: Future<Output = Result<V, E>>,
    E: From<ExecutorFault>,
{
    let views: Vec<&'a [T]> = groups.iter().map(<G as AsRef<[T]>>::as_ref).collect();
    concurrent_runs(&views, concurrency, &executor).await
}

pub(crate) async fn concurrent_runs<'a, T, V, E, F, Fut>(
    groups: &[&'a [T]],
    concurrency: usize,
    executor: &F,
) -> Vec<Settled<V, E>>
where
    F: Fn(Batch<'a, T>, usize) -> Fut,
    Fut: Future<Output = Result<V, E>>,
    E: From<ExecutorFault>,
{
    let mut settled = Vec::new();

    if concurrency > 0 {
        for run in groups.chunks(concurrency) {
            let batches = run.iter().map(|&group| Batch::Chunk(group)).collect();
            append(&mut settled, run_concurrently(batches, executor).await);
        }
    } else {
        for &group in groups {
            let batches = group.iter().map(Batch::Item).collect();
            append(&mut settled, run_concurrently(batches, executor).await);
        }
    }

    settled
}

pub(crate) async fn run_concurrently<'a, T, V, E, F, Fut>(
    batches: Vec<Batch<'a, T>>,
    executor: &F,
) -> Vec<Settled<V, E>>
where
    F: Fn(Batch<'a, T>, usize) -> Fut,
    Fut: Future<Output = Result<V, E>>,
    E: From<ExecutorFault>,
{
    tracing::trace!(invocations = batches.len(), "starting concurrent run");
    let started: Vec<_> = batches
        .into_iter()
        .enumerate()
        .map(|(index, batch)| outcome(move || executor(batch, index)))
        .collect();
    join_all(started).await
}
