//! Congestion-free polling.
//!
//! Ticks that arrive while the previous run is still in flight are skipped,
//! never queued, so runs of the executor never overlap.

use std::fmt::Display;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::FutureExt;
use timeable_types::ExecutorFault;
use tokio::task::JoinHandle;

use crate::timer;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Delay of the extra early run requested with `immediately`.
pub const IMMEDIATE_DELAY: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    /// Run once shortly after start instead of waiting a full interval.
    pub immediately: bool,
    pub immediate_delay: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            immediately: false,
            immediate_delay: IMMEDIATE_DELAY,
        }
    }
}

/// What a poll run reports back. Failures are logged and polling goes on.
pub trait TickOutcome {
    fn report(self);
}

impl TickOutcome for () {
    fn report(self) {}
}

impl<E: Display> TickOutcome for Result<(), E> {
    fn report(self) {
        if let Err(error) = self {
            tracing::warn!(%error, "Poll executor failed");
        }
    }
}

#[derive(Debug, Default)]
struct PollState {
    inflight: AtomicBool,
    stopped: AtomicBool,
}

impl PollState {
    fn try_begin(&self) -> bool {
        self.inflight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

/// Clears the in-flight flag however the run ends.
struct InflightGuard(Arc<PollState>);

impl Drop for InflightGuard {
    fn drop(&mut self) {
        self.0.inflight.store(false, Ordering::Release);
    }
}

/// Lets a run observe that polling has been stopped.
#[derive(Debug, Clone)]
pub struct Stopped {
    state: Arc<PollState>,
}

impl Stopped {
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.state.is_stopped()
    }
}

/// Controls a running poll. Dropping the handle stops polling.
///
/// Stopping prevents future runs only; a run already in flight finishes on
/// its own and can watch [`Stopped`] to bail out early.
#[must_use = "dropping a PollHandle stops polling"]
#[derive(Debug)]
pub struct PollHandle {
    state: Arc<PollState>,
    ticker: JoinHandle<()>,
    kickoff: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Idempotent.
    pub fn stop(&self) {
        if self.state.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        self.ticker.abort();
        if let Some(kickoff) = &self.kickoff {
            kickoff.abort();
        }
        tracing::debug!("Polling stopped");
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.state.is_stopped()
    }

    /// Whether a run is executing right now.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.inflight.load(Ordering::Acquire)
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Invokes `executor` every `interval`, skipping ticks while a run is in
/// flight. With `immediately`, one extra run is attempted after
/// [`IMMEDIATE_DELAY`].
///
/// Must be called from within a tokio runtime.
pub fn poll<F, Fut>(interval: Duration, immediately: bool, executor: F) -> PollHandle
where
    F: Fn(Stopped) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: TickOutcome,
{
    poll_with(
        PollOptions {
            interval,
            immediately,
            ..PollOptions::default()
        },
        executor,
    )
}

pub fn poll_with<F, Fut>(options: PollOptions, executor: F) -> PollHandle
where
    F: Fn(Stopped) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: TickOutcome,
{
    let state = Arc::new(PollState::default());
    let executor = Arc::new(executor);

    let kickoff = options.immediately.then(|| {
        let state = Arc::clone(&state);
        let executor = Arc::clone(&executor);
        tokio::spawn(async move {
            timer::sleep(options.immediate_delay).await;
            tick(&state, &executor);
        })
    });

    let ticker = {
        let state = Arc::clone(&state);
        let executor = Arc::clone(&executor);
        let mut interval = timer::interval_after(options.interval);
        tokio::spawn(async move {
            loop {
                interval.tick().await;
                tick(&state, &executor);
            }
        })
    };

    tracing::debug!(
        interval_ms = options.interval.as_millis(),
        immediately = options.immediately,
        "Polling started"
    );

    PollHandle {
        state,
        ticker,
        kickoff,
    }
}

fn tick<F, Fut>(state: &Arc<PollState>, executor: &Arc<F>)
where
    F: Fn(Stopped) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: TickOutcome,
{
    if state.is_stopped() {
        return;
    }
    if !state.try_begin() {
        tracing::trace!("Poll tick skipped; previous run still in flight");
        return;
    }

    let guard = InflightGuard(Arc::clone(state));
    let stopped = Stopped {
        state: Arc::clone(state),
    };
    let run = match panic::catch_unwind(AssertUnwindSafe(|| executor(stopped))) {
        Ok(run) => run,
        Err(payload) => {
            let fault = ExecutorFault::from_panic(payload.as_ref());
            tracing::warn!(%fault, "Poll executor panicked");
            return;
        }
    };

    tokio::spawn(async move {
        let _guard = guard;
        match AssertUnwindSafe(run).catch_unwind().await {
            Ok(output) => output.report(),
            Err(payload) => {
                let fault = ExecutorFault::from_panic(payload.as_ref());
                tracing::warn!(%fault, "Poll executor panicked");
            }
        }
    });
}
