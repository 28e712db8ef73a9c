use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::metrics::{AggregateState, MetricsAggregator};

/// One-line progress summary for a snapshot.
#[must_use]
pub fn progress_line(state: &AggregateState, elapsed: Duration) -> String {
    let seconds = elapsed.as_secs_f64();
    let rate = if seconds > 0.0 {
        state.total() as f64 / seconds
    } else {
        0.0
    };
    format!(
        "{:.1}s: {} requests ({} ok, {} failed), {:.1} req/s, p95 {:.2}ms",
        seconds,
        state.total(),
        state.successful(),
        state.failed(),
        rate,
        state.percentile(95).as_secs_f64() * 1000.0
    )
}

/// Logs a snapshot every `interval` until aborted. Reads only; never holds
/// the aggregator lock beyond one snapshot.
pub fn spawn_progress_observer(
    aggregator: Arc<MetricsAggregator>,
    interval: Duration,
    started: Instant,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let state = aggregator.snapshot();
            info!("{}", progress_line(&state, started.elapsed()));
        }
    })
}
