//! Timer plumbing shared by the timed components.

use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Shortest period a repeating timer runs at; zero periods are clamped to it.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Suspends the current task for `duration`.
pub async fn sleep(duration: Duration) {
    time::sleep(duration).await;
}

/// A repeating timer whose first tick lands one full `period` from now.
pub(crate) fn interval_after(period: Duration) -> Interval {
    let period = period.max(MIN_INTERVAL);
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
