use std::time::Duration;

use crate::error::ValidationError;

/// Default bucket width. This is the precision floor of every percentile.
pub const DEFAULT_BUCKET_WIDTH_MS: u64 = 5;
/// Upper edge of the tracked range; slower requests land in the last bucket.
pub const DEFAULT_HISTOGRAM_RANGE_MS: u64 = 20_000;

/// `DEFAULT_HISTOGRAM_RANGE_MS / DEFAULT_BUCKET_WIDTH_MS` regular buckets plus the overflow edge.
const DEFAULT_BUCKET_COUNT: usize = 4_001;
const PERCENT_DIVISOR: u128 = 100;
const MICROS_PER_MILLI: u64 = 1_000;

/// Bucket geometry shared by the aggregator and its histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistogramLayout {
    bucket_width_ms: u64,
    bucket_count: usize,
}

impl HistogramLayout {
    /// Builds `range_ms / bucket_width_ms + 1` buckets; the extra last bucket
    /// absorbs every latency at or beyond the range.
    ///
    /// # Errors
    ///
    /// Returns an error when the width is zero or the layout has fewer than
    /// two buckets.
    pub fn new(bucket_width_ms: u64, range_ms: u64) -> Result<Self, ValidationError> {
        let regular = range_ms
            .checked_div(bucket_width_ms)
            .ok_or(ValidationError::InvalidHistogramLayout)?;
        let bucket_count = usize::try_from(regular)
            .ok()
            .and_then(|count| count.checked_add(1))
            .ok_or(ValidationError::InvalidHistogramLayout)?;
        if bucket_count < 2 {
            return Err(ValidationError::InvalidHistogramLayout);
        }
        Ok(Self {
            bucket_width_ms,
            bucket_count,
        })
    }

    #[must_use]
    pub const fn bucket_width_ms(&self) -> u64 {
        self.bucket_width_ms
    }

    #[must_use]
    pub const fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// `min(floor(latency_ms / width), count - 1)` on truncated milliseconds.
    #[must_use]
    pub fn bucket_index(&self, latency: Duration) -> usize {
        let last = self.bucket_count.saturating_sub(1);
        let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        let index = millis.checked_div(self.bucket_width_ms).unwrap_or(0);
        usize::try_from(index).map_or(last, |index| index.min(last))
    }

    /// Midpoint of a bucket: `index * width + width / 2`.
    #[must_use]
    pub fn midpoint(&self, index: usize) -> Duration {
        let width_us = self.bucket_width_ms.saturating_mul(MICROS_PER_MILLI);
        let start_us = u64::try_from(index)
            .unwrap_or(u64::MAX)
            .saturating_mul(width_us);
        Duration::from_micros(start_us.saturating_add(width_us / 2))
    }
}

impl Default for HistogramLayout {
    fn default() -> Self {
        Self {
            bucket_width_ms: DEFAULT_BUCKET_WIDTH_MS,
            bucket_count: DEFAULT_BUCKET_COUNT,
        }
    }
}

/// Fixed-width latency histogram; memory depends on the layout only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatencyHistogram {
    layout: HistogramLayout,
    buckets: Box<[u64]>,
}

impl LatencyHistogram {
    #[must_use]
    pub fn new(layout: HistogramLayout) -> Self {
        Self {
            layout,
            buckets: vec![0; layout.bucket_count()].into_boxed_slice(),
        }
    }

    #[must_use]
    pub const fn layout(&self) -> HistogramLayout {
        self.layout
    }

    /// Increments the slot computed by [`HistogramLayout::bucket_index`].
    pub fn increment(&mut self, index: usize) {
        let last = self.buckets.len().saturating_sub(1);
        if let Some(slot) = self.buckets.get_mut(index.min(last)) {
            *slot = slot.saturating_add(1);
        }
    }

    pub fn record(&mut self, latency: Duration) {
        let index = self.layout.bucket_index(latency);
        self.increment(index);
    }

    #[must_use]
    pub fn buckets(&self) -> &[u64] {
        &self.buckets
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.buckets
            .iter()
            .fold(0u64, |acc, count| acc.saturating_add(*count))
    }

    /// Bucket midpoint where the cumulative count first reaches
    /// `max(1, ceil(percentile / 100 * count))`. `None` when empty.
    #[must_use]
    pub fn percentile(&self, percentile: u64) -> Option<Duration> {
        let total = self.count();
        if total == 0 {
            return None;
        }
        let scaled = u128::from(percentile).saturating_mul(u128::from(total));
        let target = scaled.div_ceil(PERCENT_DIVISOR).max(1);
        let mut cumulative: u128 = 0;
        for (index, count) in self.buckets.iter().enumerate() {
            cumulative = cumulative.saturating_add(u128::from(*count));
            if cumulative >= target {
                return Some(self.layout.midpoint(index));
            }
        }
        None
    }
}
