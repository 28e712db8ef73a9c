use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use super::histogram::{HistogramLayout, LatencyHistogram};
use super::types::RequestOutcome;

/// Running totals for one run.
///
/// `total == successful + failed` and `histogram.count() == total` hold after
/// every [`MetricsAggregator::record`] call, whatever the interleaving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateState {
    total: u64,
    successful: u64,
    failed: u64,
    latency_sum: Duration,
    latency_min: Option<Duration>,
    latency_max: Duration,
    errors: BTreeMap<&'static str, u64>,
    histogram: LatencyHistogram,
}

impl AggregateState {
    fn new(layout: HistogramLayout) -> Self {
        Self {
            total: 0,
            successful: 0,
            failed: 0,
            latency_sum: Duration::ZERO,
            latency_min: None,
            latency_max: Duration::ZERO,
            errors: BTreeMap::new(),
            histogram: LatencyHistogram::new(layout),
        }
    }

    fn apply(&mut self, outcome: &RequestOutcome, bucket: usize) {
        self.total = self.total.saturating_add(1);
        match outcome.error.as_ref() {
            None => self.successful = self.successful.saturating_add(1),
            Some(error) => {
                self.failed = self.failed.saturating_add(1);
                let count = self.errors.entry(error.tally_key()).or_insert(0);
                *count = count.saturating_add(1);
            }
        }
        self.latency_sum = self.latency_sum.saturating_add(outcome.latency);
        self.latency_min = Some(
            self.latency_min
                .map_or(outcome.latency, |min| min.min(outcome.latency)),
        );
        self.latency_max = self.latency_max.max(outcome.latency);
        self.histogram.increment(bucket);
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub const fn successful(&self) -> u64 {
        self.successful
    }

    #[must_use]
    pub const fn failed(&self) -> u64 {
        self.failed
    }

    #[must_use]
    pub const fn latency_sum(&self) -> Duration {
        self.latency_sum
    }

    /// Zero when nothing was recorded.
    #[must_use]
    pub fn latency_min(&self) -> Duration {
        self.latency_min.unwrap_or(Duration::ZERO)
    }

    #[must_use]
    pub const fn latency_max(&self) -> Duration {
        self.latency_max
    }

    #[must_use]
    pub fn latency_avg(&self) -> Duration {
        let nanos = self
            .latency_sum
            .as_nanos()
            .checked_div(u128::from(self.total))
            .unwrap_or(0);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    #[must_use]
    pub const fn errors(&self) -> &BTreeMap<&'static str, u64> {
        &self.errors
    }

    #[must_use]
    pub const fn histogram(&self) -> &LatencyHistogram {
        &self.histogram
    }

    /// Histogram estimate, precise to one bucket width. Falls back to the
    /// observed maximum, and to zero for an empty run.
    #[must_use]
    pub fn percentile(&self, percentile: u64) -> Duration {
        if self.total == 0 {
            return Duration::ZERO;
        }
        self.histogram
            .percentile(percentile)
            .unwrap_or(self.latency_max)
    }
}

/// Thread-safe accumulator shared by every request executor of a run.
#[derive(Debug)]
pub struct MetricsAggregator {
    layout: HistogramLayout,
    state: Mutex<AggregateState>,
}

impl MetricsAggregator {
    #[must_use]
    pub fn new(layout: HistogramLayout) -> Self {
        Self {
            layout,
            state: Mutex::new(AggregateState::new(layout)),
        }
    }

    #[must_use]
    pub const fn layout(&self) -> HistogramLayout {
        self.layout
    }

    /// Folds one outcome into the totals. The lock covers arithmetic only.
    pub fn record(&self, outcome: &RequestOutcome) {
        let bucket = self.layout.bucket_index(outcome.latency);
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.apply(outcome, bucket);
    }

    /// Copy of the current totals, taken in one critical section.
    #[must_use]
    pub fn snapshot(&self) -> AggregateState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new(HistogramLayout::default())
    }
}
