//! Fixed-memory request metrics: outcomes, histogram, aggregator and run result.
mod aggregator;
mod histogram;
mod result;
mod types;


pub use aggregator::{AggregateState, MetricsAggregator};
pub use histogram::{
    DEFAULT_BUCKET_WIDTH_MS, DEFAULT_HISTOGRAM_RANGE_MS, HistogramLayout, LatencyHistogram,
};
pub use result::RunResult;
pub use types::{ErrorKind, RequestError, RequestOutcome};
