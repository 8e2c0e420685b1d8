//! Strategy selection between flat and chunked-group runners.

use std::future::Future;

use timeable_types::{Batch, Chunked, ExecutorFault, Settled};
use timeable_utils::chunk;

use crate::concurrent::{concurrent_runs, run_concurrently};
use crate::consecutive::{consecutive_runs, run_consecutively};

/// Runs `executor` concurrently over `items`.
///
/// With `concurrency > 0` the items are chunked into groups of
/// `concurrency` and at most `concurrency` chunks are in flight per run, the
/// executor receiving [`Batch::Chunk`]s. With 0 every item is started at
/// once as a [`Batch::Item`].
pub async fn parallel<'a, T, V, E, F, Fut>(
    items: &'a [T],
    concurrency: usize,
    executor: F,
) -> Vec<Settled<V, E>>
where
    F: Fn(Batch<'a, T>, usize) -> Fut,
    Fut: Future<Output = Result<V, E>>,
    E: From<ExecutorFault>,
{
    match chunk(items, concurrency) {
        Chunked::Groups(groups) => concurrent_runs(&groups, concurrency, &executor).await,
        flat @ Chunked::Flat(_) => run_concurrently(flat.batches(), &executor).await,
    }
}

/// Runs `executor` over `items` one invocation at a time.
///
/// Same grouping as [`parallel`]; each run of `concurrency` chunks starts
/// with an empty accumulator.
pub async fn sequential<'a, T, V, E, F, Fut>(
    items: &'a [T],
    concurrency: usize,
    mut executor: F,
) -> Vec<Settled<V, E>>
where
    F: FnMut(Batch<'a, T>, usize, &[Settled<V, E>]) -> Fut,
    Fut: Future<Output = Result<V, E>>,
    E: From<ExecutorFault>,
{
    match chunk(items, concurrency) {
        Chunked::Groups(groups) => consecutive_runs(&groups, concurrency, &mut executor).await,
        flat @ Chunked::Flat(_) => run_consecutively(flat.batches(), 1, &mut executor).await,
    }
}
