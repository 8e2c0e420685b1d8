//! Deadline race between an executor and a timeout fallback.
//!
//! Two competing completion sources share one settle slot; whichever settles
//! first decides the outcome. The losing side is not preempted: an executor
//! still running after the deadline keeps running and must consult
//! [`Pending`] before acting on its late result.

use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::{AbortHandle, Abortable};
use timeable_types::ExecutorFault;
use tokio::sync::oneshot;

use crate::timer;

struct Shared<T, E> {
    sender: Mutex<Option<oneshot::Sender<Result<T, E>>>>,
    /// Armed once the deadline task is spawned; aborted by the winning settle.
    deadline: OnceLock<AbortHandle>,
}

/// Settles a race. Cloneable; only the first `resolve`/`reject` across all
/// clones takes effect.
pub struct Settle<T, E> {
    shared: Arc<Shared<T, E>>,
}

impl<T, E> Clone for Settle<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, E> fmt::Debug for Settle<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settle")
            .field("settled", &self.is_settled())
            .finish()
    }
}

impl<T, E> Settle<T, E> {
    fn channel() -> (Self, oneshot::Receiver<Result<T, E>>) {
        let (tx, rx) = oneshot::channel();
        let settle = Self {
            shared: Arc::new(Shared {
                sender: Mutex::new(Some(tx)),
                deadline: OnceLock::new(),
            }),
        };
        (settle, rx)
    }

    /// Returns `true` if this call decided the race.
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Returns `true` if this call decided the race.
    pub fn reject(&self, reason: E) -> bool {
        self.settle(Err(reason))
    }

    /// Settling disarms the deadline, so a timeout executor that has not
    /// started yet never runs.
    pub fn settle(&self, result: Result<T, E>) -> bool {
        let sender = self
            .shared
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(tx) = sender else {
            return false;
        };
        if let Some(deadline) = self.shared.deadline.get() {
            deadline.abort();
        }
        // Send fails only when the race future was dropped.
        tx.send(result).is_ok()
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.shared
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn arm(&self, deadline: AbortHandle) {
        if self.shared.deadline.set(deadline.clone()).is_ok() && self.is_settled() {
            // Settled before the deadline was armed.
            deadline.abort();
        }
    }

    /// Flips `pending` to expired unless the race is already settled. Holds
    /// the slot lock so a concurrent settle lands strictly before or after.
    fn expire_unless_settled(&self, pending: &Pending) -> bool {
        let sender = self
            .shared
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if sender.is_none() {
            return false;
        }
        pending.expire();
        true
    }
}

/// Read-only view of whether the deadline is still ahead.
#[derive(Debug, Clone)]
pub struct Pending {
    expired: Arc<AtomicBool>,
}

impl Pending {
    fn new() -> Self {
        Self {
            expired: Arc::new(AtomicBool::new(false)),
        }
    }

    /// `true` until the deadline fires; never flips back.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.expired.load(Ordering::Acquire)
    }

    fn expire(&self) {
        self.expired.store(true, Ordering::Release);
    }
}

/// The delayed timeout callback. Cancelled when the race settles or is
/// dropped, unless it already fired.
struct DeadlineTimer {
    abort: AbortHandle,
    pending: Pending,
}

impl DeadlineTimer {
    fn start<T, E, G>(timeout: Duration, pending: Pending, settle: Settle<T, E>, on_timeout: G) -> Self
    where
        T: Send + 'static,
        E: From<ExecutorFault> + Send + 'static,
        G: FnOnce(Settle<T, E>) + Send + 'static,
    {
        let (abort, registration) = AbortHandle::new_pair();
        let expired = pending.clone();
        let armed = settle.clone();
        let task = async move {
            timer::sleep(timeout).await;
            if !settle.expire_unless_settled(&expired) {
                return;
            }
            tracing::debug!(
                timeout_ms = timeout.as_millis(),
                "Deadline elapsed; running timeout executor"
            );
            let fallback = settle.clone();
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| on_timeout(fallback))) {
                let fault = ExecutorFault::from_panic(payload.as_ref());
                tracing::warn!(%fault, "Timeout executor panicked");
                settle.reject(E::from(fault));
            }
        };
        tokio::spawn(async move {
            // Aborted means the race settled or was dropped first.
            let _ = Abortable::new(task, registration).await;
        });
        armed.arm(abort.clone());
        Self { abort, pending }
    }
}

impl Drop for DeadlineTimer {
    fn drop(&mut self) {
        if self.pending.is_pending() {
            self.abort.abort();
        }
    }
}

/// Races `executor` against a timeout.
///
/// Everything is set up on call, before the returned future is first
/// polled: the timeout callback is scheduled, then `executor` is invoked
/// with a [`Settle`] handle and a [`Pending`] view and its future is spawned
/// onto the runtime. If `timeout` elapses before anything settles, `Pending`
/// flips to expired and `timeout_executor` runs with its own `Settle` handle.
/// The first settlement wins and cancels the timeout callback; later calls
/// are no-ops that return `false`.
///
/// Rejections from either side propagate unchanged. A panic on either side
/// rejects with [`ExecutorFault::Panicked`]; if every handle is dropped
/// without settling the race rejects with [`ExecutorFault::Unsettled`].
/// Dropping the returned future before the deadline also cancels the timeout
/// callback.
///
/// Must be called from within a tokio runtime.
pub fn until_settled_or_timed_out<T, E, F, Fut, G>(
    executor: F,
    timeout_executor: G,
    timeout: Duration,
) -> impl Future<Output = Result<T, E>>
where
    T: Send + 'static,
    E: From<ExecutorFault> + Send + 'static,
    F: FnOnce(Settle<T, E>, Pending) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
    G: FnOnce(Settle<T, E>) + Send + 'static,
{
    let (settle, settled) = Settle::channel();
    let pending = Pending::new();
    let deadline = DeadlineTimer::start(timeout, pending.clone(), settle.clone(), timeout_executor);

    let handle = settle.clone();
    match panic::catch_unwind(AssertUnwindSafe(|| executor(handle, pending))) {
        Ok(work) => {
            tokio::spawn(async move {
                if let Err(payload) = AssertUnwindSafe(work).catch_unwind().await {
                    let fault = ExecutorFault::from_panic(payload.as_ref());
                    tracing::warn!(%fault, "Race executor panicked");
                    settle.reject(E::from(fault));
                }
            });
        }
        Err(payload) => {
            let fault = ExecutorFault::from_panic(payload.as_ref());
            tracing::warn!(%fault, "Race executor panicked");
            settle.reject(E::from(fault));
        }
    }

    async move {
        let result = settled
            .await
            .unwrap_or_else(|_| Err(E::from(ExecutorFault::Unsettled)));
        drop(deadline);
        result
    }
}
