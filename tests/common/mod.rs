//! Shared test utilities and fixtures

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use timeable_types::ExecutorFault;

/// Error type for executors under test; panics arrive as `Fault`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TestError {
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("timed out")]
    TimedOut,
    #[error(transparent)]
    Fault(#[from] ExecutorFault),
}

pub fn rejected(reason: &str) -> TestError {
    TestError::Rejected(reason.to_string())
}

/// Resolves to `value` after `ms` milliseconds.
pub async fn delayed<V>(value: V, ms: u64) -> Result<V, TestError> {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    Ok(value)
}

/// Tracks how many executor invocations are in flight at once.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl InFlight {
    pub fn enter(&self) -> InFlightGuard {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlightGuard(Arc::clone(&self.current))
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

pub struct InFlightGuard(Arc<AtomicUsize>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
