use crate::args::LoadArgs;
use crate::domain::run::{DirectoryPool, RunConfig};
use crate::error::{AppError, AppResult, ValidationError};

/// Maps parsed (and config-merged) arguments onto the run configuration.
///
/// # Errors
///
/// Returns an error when the URL is missing or invalid, or the directory
/// pool is misconfigured.
pub fn to_run_config(args: &LoadArgs) -> AppResult<RunConfig> {
    let Some(url) = args.url.as_deref() else {
        tracing::error!("Missing URL (set --url or provide in config).");
        return Err(AppError::validation(ValidationError::MissingUrl));
    };

    let mut config = RunConfig::new(url)?;
    config.concurrency = args.concurrency.non_zero();
    config.duration = args.duration;
    config.max_requests = args.requests.map(|requests| requests.get());
    config.request_timeout = args.request_timeout;
    config.connect_timeout = args.connect_timeout;
    config.keep_alive = !args.no_keepalive;
    config.pool_max_idle_per_host = args.pool_max_idle;
    config.mode = args.mode.to_domain();
    config.endpoint.clone_from(&args.endpoint);
    config.directories = DirectoryPool::new(
        args.directory_prefix.clone(),
        args.directories.non_zero(),
        args.manifest_name.clone(),
    )?;
    config.cache_bust = args.cache_bust;
    config.pace = args.pace;
    config.progress_interval = args.progress_interval;
    Ok(config)
}
