use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error, info};

use super::context::{RunContext, StopReason};
use super::progress::spawn_progress_observer;
use crate::dash::{SegmentDescriptor, SegmentKind};
use crate::domain::{RunConfig, WorkloadMode};
use crate::error::AppResult;
use crate::http::{RequestExecutor, build_client};
use crate::metrics::{MetricsAggregator, RunResult};
use crate::shutdown::StopFlag;
use crate::shutdown_handlers::setup_signal_shutdown_handler;
use crate::worker::ClientWorker;

const PLAIN_REPRESENTATION: &str = "plain";

/// Owns one run: pool, aggregator, stop flag and the worker tasks.
#[derive(Debug)]
pub struct Coordinator {
    config: RunConfig,
    stop: StopFlag,
    signal_handlers: bool,
}

impl Coordinator {
    #[must_use]
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            stop: StopFlag::new(),
            signal_handlers: true,
        }
    }

    /// Handle for stopping the run from outside.
    #[must_use]
    pub fn stop_flag(&self) -> StopFlag {
        self.stop.clone()
    }

    /// Leaves SIGINT/SIGTERM alone; the caller drives [`Self::stop_flag`].
    #[must_use]
    pub const fn without_signal_handlers(mut self) -> Self {
        self.signal_handlers = false;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Spawns `concurrency` workers, waits for all of them and summarizes
    /// one final snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error only for setup failures (client construction, plain
    /// target URL). Request and worker failures end up in the result.
    pub async fn run(self) -> AppResult<RunResult> {
        let config = &self.config;
        let client = build_client(config)?;
        let aggregator = Arc::new(MetricsAggregator::new(config.histogram));
        let executor = RequestExecutor::new(client, Arc::clone(&aggregator), config.cache_bust);
        let plain_target = match config.mode {
            WorkloadMode::Plain => Some(SegmentDescriptor {
                url: config.plain_url()?,
                kind: SegmentKind::Media,
                representation_id: PLAIN_REPRESENTATION.to_owned(),
                sequence_number: None,
            }),
            WorkloadMode::Dash => None,
        };

        let signal_handle = self
            .signal_handlers
            .then(|| setup_signal_shutdown_handler(&self.stop));
        let context = Arc::new(RunContext::new(
            config,
            executor,
            self.stop.clone(),
            plain_target,
        ));
        let progress = config.progress_interval.map(|interval| {
            spawn_progress_observer(Arc::clone(&aggregator), interval, context.started())
        });

        info!(
            "Starting {} clients against {} ({} mode)",
            config.concurrency,
            config.target_url,
            config.mode.as_str()
        );

        let mut workers = JoinSet::new();
        for id in 0..config.concurrency.get() {
            let worker = ClientWorker::new(id, Arc::clone(&context));
            workers.spawn(worker.run());
        }

        let mut exits: BTreeMap<StopReason, usize> = BTreeMap::new();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(reason) => {
                    let count = exits.entry(reason).or_insert(0);
                    *count = count.saturating_add(1);
                }
                Err(err) => error!("Client task failed: {}", err),
            }
        }
        let elapsed = context.started().elapsed();

        if let Some(handle) = progress {
            handle.abort();
        }
        if let Some(handle) = signal_handle {
            handle.abort();
        }
        for (reason, count) in &exits {
            debug!("{} clients stopped: {}", count, reason.as_str());
        }

        let result = RunResult::from_snapshot(&aggregator.snapshot(), elapsed);
        info!(
            "Run finished: {} requests ({} failed) in {:.2}s",
            result.total_requests, result.failed_requests, result.total_time
        );
        Ok(result)
    }
}
