//! Waiting on a condition with an upper bound.

use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use futures_util::future::{AbortHandle, Abortable};
use timeable_types::ExecutorFault;

use crate::race::{Settle, until_settled_or_timed_out};
use crate::timer;

pub const DEFAULT_WAIT_INTERVAL: Duration = Duration::from_secs(1);

/// Stops the predicate checks when the wait is over or abandoned.
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Resolves once `predicate` returns `true` on an interval check, or once
/// `timeout` elapses, whichever comes first.
///
/// The predicate is first checked one `interval` after the call. Reaching
/// the timeout is not an error. A panicking predicate ends the wait early and
/// is logged.
pub async fn wait_for<P>(predicate: P, timeout: Duration, interval: Duration)
where
    P: Fn() -> bool + Send + Sync + 'static,
{
    let (abort, registration) = AbortHandle::new_pair();
    let _checks = AbortOnDrop(abort.clone());

    let result = until_settled_or_timed_out::<(), ExecutorFault, _, _, _>(
        move |settle, pending| {
            let mut ticker = timer::interval_after(interval);
            let checks = async move {
                loop {
                    ticker.tick().await;
                    match panic::catch_unwind(AssertUnwindSafe(&predicate)) {
                        Ok(true) => {
                            if pending.is_pending() {
                                settle.resolve(());
                            }
                            break;
                        }
                        Ok(false) => {}
                        Err(payload) => {
                            settle.reject(ExecutorFault::from_panic(payload.as_ref()));
                            break;
                        }
                    }
                }
            };
            async move {
                // Aborted means the deadline already settled the race.
                let _ = Abortable::new(checks, registration).await;
            }
        },
        move |settle: Settle<(), ExecutorFault>| {
            abort.abort();
            settle.resolve(());
        },
        timeout,
    )
    .await;

    if let Err(fault) = result {
        tracing::warn!(%fault, "Wait predicate failed; giving up early");
    }
}
