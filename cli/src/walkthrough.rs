//! Runnable tour of every timeable operation.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use timeable_config::TimeableConfig;
use timeable_core::{
    Batch, ExecutorFault, PollOptions, Settle, Settled, concurrent, concurrents, consecutive,
    consecutives, parallel, poll_with, sequential, sleep, until_settled_or_timed_out, wait_for,
};
use timeable_utils::{chunk, to_number};

/// Knobs for one walkthrough run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub concurrency: usize,
    pub poll: PollOptions,
    pub wait_interval: Duration,
    pub wait_timeout: Duration,
}

impl Default for Settings {
    /// Millisecond timings so the tour finishes almost instantly.
    fn default() -> Self {
        Self {
            concurrency: 0,
            poll: PollOptions {
                interval: Duration::from_millis(1),
                ..PollOptions::default()
            },
            wait_interval: Duration::from_millis(2),
            wait_timeout: Duration::from_millis(3),
        }
    }
}

impl Settings {
    pub fn from_config(config: Option<&TimeableConfig>) -> Self {
        match config {
            Some(config) => Self {
                concurrency: config.concurrency(),
                poll: config.poll_options(),
                wait_interval: config.wait_interval(),
                wait_timeout: config.wait_timeout(),
            },
            None => Self::default(),
        }
    }
}

fn render<V: Serialize>(settled: Vec<Settled<V, ExecutorFault>>) -> Result<String> {
    let settled: Vec<Settled<V, String>> = settled
        .into_iter()
        .map(|outcome| outcome.map_reason(|fault| fault.to_string()))
        .collect();
    Ok(serde_json::to_string(&settled)?)
}

#[derive(Debug, thiserror::Error)]
enum StepError {
    #[error("timeout")]
    Timeout,
    #[error(transparent)]
    Fault(#[from] ExecutorFault),
}

async fn echo(batch: Batch<'_, &'static str>) -> Result<Vec<&'static str>, ExecutorFault> {
    Ok(batch.to_vec())
}

/// Runs the tour, writing one line per step to `out`.
pub async fn run<W: Write>(out: &mut W, settings: &Settings) -> Result<()> {
    let flat: [&'static str; 3] = ["a", "b", "c"];
    let nested: [&[&'static str]; 2] = [&["a", "b"], &["c"]];
    let c = settings.concurrency;

    let chunked = chunk(&[1, 2, 3, 4], 2);
    writeln!(
        out,
        "1. Chunk -> {}",
        serde_json::to_string(&chunked.groups().unwrap_or(&[]))?
    )?;

    let settled = concurrent(&flat, c, |batch, _| echo(batch)).await;
    writeln!(out, "2. Concurrent -> {}", render(settled)?)?;

    let settled = concurrents(&nested, c, |batch, _| echo(batch)).await;
    writeln!(out, "3. Concurrents -> {}", render(settled)?)?;

    let settled = consecutive(&flat, c, |batch, _, _: &[Settled<_, _>]| echo(batch)).await;
    writeln!(out, "4. Consecutive -> {}", render(settled)?)?;

    let settled = consecutives(&nested, c, |batch, _, _: &[Settled<_, _>]| echo(batch)).await;
    writeln!(out, "5. Consecutives -> {}", render(settled)?)?;

    let settled = parallel(&flat, c, |batch, _| echo(batch)).await;
    writeln!(out, "6. Parallel -> {}", render(settled)?)?;

    let ticks = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&ticks);
    let poller = poll_with(settings.poll, move |_| {
        counter.fetch_add(1, Ordering::Relaxed);
        async {}
    });
    sleep(settings.poll.interval * 3).await;
    poller.stop();
    writeln!(
        out,
        "7. Poll -> ticked {} time(s) until stopped",
        ticks.load(Ordering::Relaxed)
    )?;

    let settled = sequential(&flat, c, |batch, _, _: &[Settled<_, _>]| echo(batch)).await;
    writeln!(out, "8. Sequential -> {}", render(settled)?)?;

    sleep(Duration::from_millis(1)).await;
    writeln!(out, "9. Sleep -> paused ~1ms")?;

    writeln!(out, "10. ToNumber -> \"1\" -> {}", to_number("1", 0.0))?;

    let settled = until_settled_or_timed_out(
        |settle: Settle<bool, StepError>, pending| async move {
            if pending.is_pending() {
                settle.resolve(true);
            }
        },
        |settle| {
            settle.reject(StepError::Timeout);
        },
        Duration::from_millis(1),
    )
    .await
    .unwrap_or(false);
    writeln!(out, "11. Settle -> finished before timeout -> {settled}")?;

    let timed_out = until_settled_or_timed_out(
        |settle: Settle<bool, StepError>, pending| async move {
            sleep(Duration::from_millis(3)).await;
            if pending.is_pending() {
                settle.resolve(true);
            }
        },
        |settle| {
            settle.reject(StepError::Timeout);
        },
        Duration::from_millis(2),
    )
    .await;
    writeln!(
        out,
        "12. Timeout -> took too long -> {}",
        serde_json::to_string(&Settled::from(timed_out).map_reason(|err| err.to_string()))?
    )?;

    let inflight = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&inflight);
    let half = settings.wait_interval / 2;
    tokio::spawn(async move {
        sleep(half).await;
        flag.store(false, Ordering::Release);
    });
    wait_for(
        move || !inflight.load(Ordering::Acquire),
        settings.wait_timeout,
        settings.wait_interval,
    )
    .await;
    writeln!(out, "13. WaitFor -> waited until condition met")?;

    Ok(())
}
