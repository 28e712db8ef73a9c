use super::*;
use crate::domain::{RunConfig, WorkloadMode};
use crate::http::{RequestExecutor, build_client};
use crate::metrics::{MetricsAggregator, RequestOutcome};
use crate::shutdown::StopFlag;
use crate::test_support::{Reply, run_async_test, simple_manifest, spawn_server};
use crate::worker::ClientWorker;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn context_for(config: &RunConfig, stop: StopFlag) -> Result<Arc<RunContext>, String> {
    let client = build_client(config).map_err(|err| err.to_string())?;
    let executor = RequestExecutor::new(client, Arc::new(MetricsAggregator::default()), false);
    Ok(Arc::new(RunContext::new(config, executor, stop, None)))
}

fn dash_server() -> Result<crate::test_support::TestServer, String> {
    let manifest = simple_manifest("480p", 3);
    spawn_server(move |path| {
        if path.ends_with("manifest.mpd") {
            Reply::text(&manifest)
        } else {
            Reply::text("segment-bytes")
        }
    })
}

#[test]
fn budget_reservations_never_exceed_the_limit() -> Result<(), String> {
    let budget = Arc::new(RequestBudget::new(1_000));
    let mut handles = Vec::new();
    for _ in 0..8 {
        let budget = Arc::clone(&budget);
        handles.push(std::thread::spawn(move || {
            let mut reserved = 0u64;
            while budget.try_reserve() {
                reserved = reserved.saturating_add(1);
            }
            reserved
        }));
    }
    let mut total = 0u64;
    for handle in handles {
        let reserved = handle
            .join()
            .map_err(|_| "reserving thread panicked".to_owned())?;
        total = total.saturating_add(reserved);
    }
    if total != 1_000 || budget.remaining() != 0 {
        return Err(format!("Reserved {} with {} left", total, budget.remaining()));
    }
    Ok(())
}

#[test]
fn zero_duration_is_elapsed_immediately() -> Result<(), String> {
    let mut config = RunConfig::new("http://localhost:1").map_err(|err| err.to_string())?;
    config.duration = Some(Duration::ZERO);
    let context = context_for(&config, StopFlag::new())?;
    if context.should_stop() != Some(StopReason::DurationElapsed) {
        return Err(format!("Unexpected stop check {:?}", context.should_stop()));
    }
    Ok(())
}

#[test]
fn stop_flag_wins_over_budget() -> Result<(), String> {
    let mut config = RunConfig::new("http://localhost:1").map_err(|err| err.to_string())?;
    config.max_requests = Some(5);
    let stop = StopFlag::new();
    let context = context_for(&config, stop.clone())?;
    context.begin_request().map_err(|reason| format!("{:?}", reason))?;
    stop.stop();
    if context.begin_request() != Err(StopReason::Signalled) {
        return Err("Expected Signalled after stop".to_owned());
    }
    let remaining = context.budget().map(RequestBudget::remaining);
    if remaining != Some(4) {
        return Err(format!("Stopped check consumed budget: {:?}", remaining));
    }
    Ok(())
}

#[test]
fn pause_is_cut_short_by_stop() -> Result<(), String> {
    run_async_test(async {
        let mut config = RunConfig::new("http://localhost:1").map_err(|err| err.to_string())?;
        config.pace = Some(Duration::from_secs(30));
        let stop = StopFlag::new();
        let context = context_for(&config, stop.clone())?;
        let stopper = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            stop.stop();
        });
        tokio::time::timeout(Duration::from_secs(2), context.pause())
            .await
            .map_err(|err| format!("pause ignored stop: {}", err))?;
        stopper
            .await
            .map_err(|err| format!("stopper join error: {}", err))?;
        Ok(())
    })
}

#[test]
fn pause_ends_at_the_deadline() -> Result<(), String> {
    run_async_test(async {
        let mut config = RunConfig::new("http://localhost:1").map_err(|err| err.to_string())?;
        config.pace = Some(Duration::from_secs(30));
        config.duration = Some(Duration::from_millis(100));
        let context = context_for(&config, StopFlag::new())?;
        tokio::time::timeout(Duration::from_secs(2), context.pause())
            .await
            .map_err(|err| format!("pause overran the deadline: {}", err))?;
        if context.should_stop() != Some(StopReason::DurationElapsed) {
            return Err(format!("Unexpected stop state {:?}", context.should_stop()));
        }
        Ok(())
    })
}

#[test]
fn paced_run_stops_near_its_duration() -> Result<(), String> {
    run_async_test(async {
        let server = spawn_server(|_| Reply::text("ok"))?;
        let mut config = RunConfig::new(server.base_url()).map_err(|err| err.to_string())?;
        config.mode = WorkloadMode::Plain;
        config.concurrency = NonZeroUsize::new(2).ok_or_else(|| "zero".to_owned())?;
        config.duration = Some(Duration::from_millis(300));
        config.pace = Some(Duration::from_secs(4));
        let started = Instant::now();
        let result = Coordinator::new(config)
            .without_signal_handlers()
            .run()
            .await
            .map_err(|err| err.to_string())?;
        if started.elapsed() > Duration::from_secs(2) {
            return Err(format!("Paced run overran: {:?}", started.elapsed()));
        }
        if result.total_requests != 2 {
            return Err(format!("Expected one request per client, got {:?}", result));
        }
        Ok(())
    })
}

#[test]
fn in_flight_tail_after_stop_is_bounded_by_concurrency() -> Result<(), String> {
    const CONCURRENCY: usize = 6;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(async {
        let server = dash_server()?;
        let config = RunConfig::new(server.base_url()).map_err(|err| err.to_string())?;
        let stop = StopFlag::new();
        let context = context_for(&config, stop.clone())?;

        let mut workers = tokio::task::JoinSet::new();
        for id in 0..CONCURRENCY {
            workers.spawn(ClientWorker::new(id, Arc::clone(&context)).run());
        }
        tokio::time::sleep(Duration::from_millis(300)).await;
        stop.stop();
        let at_stop = context.executor().aggregator().snapshot().total();

        while let Some(joined) = workers.join_next().await {
            let reason = joined.map_err(|err| format!("worker join error: {}", err))?;
            if reason != StopReason::Signalled {
                return Err(format!("Unexpected stop reason {:?}", reason));
            }
        }
        let final_total = context.executor().aggregator().snapshot().total();
        if at_stop == 0 {
            return Err("No requests completed before stop".to_owned());
        }
        let tail = final_total.saturating_sub(at_stop);
        if tail > CONCURRENCY as u64 {
            return Err(format!("{} requests completed after stop", tail));
        }
        Ok(())
    })
}

#[test]
fn coordinator_honours_request_budget() -> Result<(), String> {
    run_async_test(async {
        let server = dash_server()?;
        let mut config = RunConfig::new(server.base_url()).map_err(|err| err.to_string())?;
        config.concurrency = NonZeroUsize::new(3).ok_or_else(|| "zero".to_owned())?;
        config.max_requests = Some(40);
        let result = Coordinator::new(config)
            .without_signal_handlers()
            .run()
            .await
            .map_err(|err| err.to_string())?;
        if result.total_requests != 40 || result.failed_requests != 0 {
            return Err(format!("Unexpected result {:?}", result));
        }
        if server.hits() != 40 {
            return Err(format!("Server saw {} requests", server.hits()));
        }
        Ok(())
    })
}

#[test]
fn coordinator_stops_on_duration() -> Result<(), String> {
    run_async_test(async {
        let server = spawn_server(|_| Reply::text("ok"))?;
        let mut config = RunConfig::new(server.base_url()).map_err(|err| err.to_string())?;
        config.mode = WorkloadMode::Plain;
        config.concurrency = NonZeroUsize::new(2).ok_or_else(|| "zero".to_owned())?;
        config.duration = Some(Duration::from_millis(300));
        config.progress_interval = Some(Duration::from_millis(50));
        let started = Instant::now();
        let result = Coordinator::new(config)
            .without_signal_handlers()
            .run()
            .await
            .map_err(|err| err.to_string())?;
        if started.elapsed() > Duration::from_secs(5) {
            return Err(format!("Run overran: {:?}", started.elapsed()));
        }
        if result.successful_requests == 0 || result.total_time < 0.3 {
            return Err(format!("Unexpected result {:?}", result));
        }
        Ok(())
    })
}

#[test]
fn external_stop_ends_the_run() -> Result<(), String> {
    run_async_test(async {
        let server = spawn_server(|_| Reply::text("ok"))?;
        let mut config = RunConfig::new(server.base_url()).map_err(|err| err.to_string())?;
        config.mode = WorkloadMode::Plain;
        config.pace = Some(Duration::from_millis(10));
        let coordinator = Coordinator::new(config).without_signal_handlers();
        let stop = coordinator.stop_flag();
        let stopper = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            stop.stop();
        });
        let result = tokio::time::timeout(Duration::from_secs(5), coordinator.run())
            .await
            .map_err(|err| format!("Run ignored stop: {}", err))?
            .map_err(|err| err.to_string())?;
        stopper
            .await
            .map_err(|err| format!("stopper join error: {}", err))?;
        if result.total_requests == 0 {
            return Err("Expected some requests before stop".to_owned());
        }
        Ok(())
    })
}

#[test]
fn progress_line_reports_counts() -> Result<(), String> {
    let aggregator = MetricsAggregator::default();
    aggregator.record(&RequestOutcome::success(Duration::from_millis(20)));
    aggregator.record(&RequestOutcome::success(Duration::from_millis(40)));
    let line = progress_line(&aggregator.snapshot(), Duration::from_secs(2));
    if !line.starts_with("2.0s: 2 requests (2 ok, 0 failed), 1.0 req/s") {
        return Err(format!("Unexpected progress line {}", line));
    }
    Ok(())
}
