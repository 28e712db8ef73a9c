use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use url::Url;

use crate::dash::SegmentDescriptor;
use crate::domain::{DirectoryPool, RunConfig, WorkloadMode};
use crate::http::RequestExecutor;
use crate::shutdown::StopFlag;

/// Why a worker reached `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StopReason {
    Signalled,
    DurationElapsed,
    BudgetExhausted,
    ManifestUnavailable,
    EmptyManifest,
    NoMediaSegments,
    InvalidTarget,
}

impl StopReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            StopReason::Signalled => "signalled",
            StopReason::DurationElapsed => "duration elapsed",
            StopReason::BudgetExhausted => "request budget exhausted",
            StopReason::ManifestUnavailable => "manifest unavailable",
            StopReason::EmptyManifest => "manifest without segments",
            StopReason::NoMediaSegments => "no media segments",
            StopReason::InvalidTarget => "invalid target url",
        }
    }
}

/// Total request cap shared by every worker. A slot is reserved before a
/// request is sent, so the cap is never exceeded.
#[derive(Debug)]
pub struct RequestBudget {
    remaining: AtomicU64,
}

impl RequestBudget {
    #[must_use]
    pub const fn new(limit: u64) -> Self {
        Self {
            remaining: AtomicU64::new(limit),
        }
    }

    pub fn try_reserve(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |remaining| {
                remaining.checked_sub(1)
            })
            .is_ok()
    }

    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.remaining.load(Ordering::Acquire)
    }
}

/// Everything a worker shares with its siblings for one run.
#[derive(Debug)]
pub struct RunContext {
    executor: RequestExecutor,
    stop: StopFlag,
    started: Instant,
    deadline: Option<Instant>,
    budget: Option<RequestBudget>,
    pace: Option<Duration>,
    target_url: Url,
    directories: DirectoryPool,
    plain_target: Option<SegmentDescriptor>,
}

impl RunContext {
    /// `plain_target` is required in plain mode and ignored otherwise.
    #[must_use]
    pub fn new(
        config: &RunConfig,
        executor: RequestExecutor,
        stop: StopFlag,
        plain_target: Option<SegmentDescriptor>,
    ) -> Self {
        let started = Instant::now();
        Self {
            executor,
            stop,
            started,
            deadline: config
                .duration
                .and_then(|duration| started.checked_add(duration)),
            budget: config.max_requests.map(RequestBudget::new),
            pace: config.pace,
            target_url: config.target_url.clone(),
            directories: config.directories.clone(),
            plain_target: match config.mode {
                WorkloadMode::Plain => plain_target,
                WorkloadMode::Dash => None,
            },
        }
    }

    #[must_use]
    pub const fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    #[must_use]
    pub const fn stop_flag(&self) -> &StopFlag {
        &self.stop
    }

    #[must_use]
    pub const fn started(&self) -> Instant {
        self.started
    }

    #[must_use]
    pub const fn target_url(&self) -> &Url {
        &self.target_url
    }

    #[must_use]
    pub const fn directories(&self) -> &DirectoryPool {
        &self.directories
    }

    #[must_use]
    pub const fn plain_target(&self) -> Option<&SegmentDescriptor> {
        self.plain_target.as_ref()
    }

    #[must_use]
    pub const fn budget(&self) -> Option<&RequestBudget> {
        self.budget.as_ref()
    }

    /// Stop flag or elapsed duration. The budget is checked by
    /// [`Self::begin_request`].
    #[must_use]
    pub fn should_stop(&self) -> Option<StopReason> {
        if self.stop.is_stopped() {
            return Some(StopReason::Signalled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(StopReason::DurationElapsed),
            Some(_) | None => None,
        }
    }

    /// Loop-boundary check run before every request.
    ///
    /// # Errors
    ///
    /// Returns the reason the worker must stop instead of sending.
    pub fn begin_request(&self) -> Result<(), StopReason> {
        if let Some(reason) = self.should_stop() {
            return Err(reason);
        }
        match self.budget.as_ref() {
            Some(budget) if !budget.try_reserve() => Err(StopReason::BudgetExhausted),
            Some(_) | None => Ok(()),
        }
    }

    /// Optional pause between media requests, cut short by the stop flag and
    /// capped at the run deadline.
    pub async fn pause(&self) {
        let Some(pace) = self.pace else {
            return;
        };
        let wake = match (Instant::now().checked_add(pace), self.deadline) {
            (Some(paced), Some(deadline)) => Some(paced.min(deadline)),
            (paced, None) => paced,
            (None, deadline) => deadline,
        };
        let Some(wake) = wake else {
            self.stop.stopped().await;
            return;
        };
        tokio::select! {
            () = tokio::time::sleep_until(tokio::time::Instant::from_std(wake)) => {}
            () = self.stop.stopped() => {}
        }
    }
}
