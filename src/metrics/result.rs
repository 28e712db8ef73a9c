use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use super::aggregator::AggregateState;

const P50: u64 = 50;
const P95: u64 = 95;
const P99: u64 = 99;
const PERCENT: f64 = 100.0;

/// Final, read-only summary of a run. Latencies are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub total_time: f64,
    pub requests_per_second: f64,
    pub avg_response_time: f64,
    pub min_response_time: f64,
    pub max_response_time: f64,
    pub p50_response_time: f64,
    pub p95_response_time: f64,
    pub p99_response_time: f64,
    /// Failed share of all requests, in percent.
    pub error_rate: f64,
    pub errors: BTreeMap<String, u64>,
}

impl RunResult {
    /// Derives every statistic from one snapshot taken after the workers
    /// stopped.
    #[must_use]
    pub fn from_snapshot(state: &AggregateState, elapsed: Duration) -> Self {
        let total_time = elapsed.as_secs_f64();
        let total = state.total();
        let requests_per_second = if total_time > 0.0 {
            total as f64 / total_time
        } else {
            0.0
        };
        let error_rate = if total > 0 {
            state.failed() as f64 / total as f64 * PERCENT
        } else {
            0.0
        };
        let errors = state
            .errors()
            .iter()
            .map(|(key, count)| ((*key).to_owned(), *count))
            .collect();

        Self {
            total_requests: total,
            successful_requests: state.successful(),
            failed_requests: state.failed(),
            total_time,
            requests_per_second,
            avg_response_time: state.latency_avg().as_secs_f64(),
            min_response_time: state.latency_min().as_secs_f64(),
            max_response_time: state.latency_max().as_secs_f64(),
            p50_response_time: state.percentile(P50).as_secs_f64(),
            p95_response_time: state.percentile(P95).as_secs_f64(),
            p99_response_time: state.percentile(P99).as_secs_f64(),
            error_rate,
            errors,
        }
    }

    /// Aggregate-level failure: something was attempted and nothing worked.
    #[must_use]
    pub const fn is_total_failure(&self) -> bool {
        self.total_requests > 0 && self.successful_requests == 0
    }
}
