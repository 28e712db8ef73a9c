//! Binary entry point: parse, configure, run, report.
use std::ffi::OsString;
use std::path::Path;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::adapters::cli::to_run_config;
use crate::args::LoadArgs;
use crate::config::{apply_config, load_config};
use crate::error::{AppError, AppResult};
use crate::report::{print_summary, write_json};
use crate::run::Coordinator;

/// Default config filenames checked when no CLI args are provided.
const DEFAULT_CONFIG_FILES: [&str; 2] = ["dashblast.toml", "dashblast.json"];

/// Runs the CLI to completion.
///
/// # Errors
///
/// Returns an error for invalid arguments or configuration, when the runtime
/// cannot start, or when the run saw no successful request at all.
pub fn run() -> AppResult<()> {
    let (mut args, matches) = match parse_args()? {
        Some(parsed) => parsed,
        None => return Ok(()),
    };

    crate::logger::init_logging(args.verbose, args.no_color);

    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, &matches, &config)?;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args))
}

fn parse_args() -> AppResult<Option<(LoadArgs, ArgMatches)>> {
    let mut cmd = LoadArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = LoadArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    !has_default_config()
}

fn has_default_config() -> bool {
    DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}

async fn run_async(args: LoadArgs) -> AppResult<()> {
    let config = to_run_config(&args)?;
    let coordinator = Coordinator::new(config.clone());
    let result = coordinator.run().await?;

    print_summary(&result);

    if let Some(path) = args.output.as_deref() {
        write_json(&result, &config, path).await?;
        tracing::info!("Results written to {}", path);
    }

    if result.is_total_failure() {
        return Err(AppError::NoSuccessfulRequests {
            total: result.total_requests,
        });
    }
    Ok(())
}
