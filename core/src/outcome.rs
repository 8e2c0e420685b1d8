//! Failure boundary between executors and runners.

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures_util::FutureExt;
use timeable_types::{ExecutorFault, Settled};

/// Invokes `executor` and captures how it settles.
///
/// The executor is called before this function returns, so its synchronous
/// part runs in call order; the returned future drives the rest. `Err(reason)`
/// becomes `Rejected { reason }` unchanged. A panic, either while building the
/// future or while polling it, becomes `Rejected` via `From<ExecutorFault>`.
/// The returned future itself never fails.
pub fn outcome<F, Fut, V, E>(executor: F) -> impl Future<Output = Settled<V, E>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, E>>,
    E: From<ExecutorFault>,
{
    let started = panic::catch_unwind(AssertUnwindSafe(executor))
        .map_err(|payload| ExecutorFault::from_panic(payload.as_ref()));

    async move {
        let future = match started {
            Ok(future) => future,
            Err(fault) => return Settled::rejected(E::from(fault)),
        };

        match AssertUnwindSafe(future).catch_unwind().await {
            Ok(result) => Settled::from(result),
            Err(payload) => Settled::rejected(E::from(ExecutorFault::from_panic(payload.as_ref()))),
        }
    }
}
