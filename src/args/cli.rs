use clap::Parser;
use std::time::Duration;

use super::parsers::{parse_duration_arg, parse_positive_u64, parse_positive_usize};
use super::types::{Mode, PositiveU64, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Async MPEG-DASH traffic generator - many concurrent streaming clients hammering a manifest and its segments, with fixed-memory latency statistics."
)]
pub struct LoadArgs {
    /// Target base URL (http or https)
    #[arg(long, short)]
    pub url: Option<String>,

    /// Number of concurrent simulated clients
    #[arg(
        long,
        short = 'c',
        aliases = ["clients", "connections"],
        default_value = "10",
        value_parser = parse_positive_usize
    )]
    pub concurrency: PositiveUsize,

    /// Stop after this long (supports ms/s/m/h); runs until interrupted if neither this nor --requests is set
    #[arg(long, short = 't', value_parser = parse_duration_arg)]
    pub duration: Option<Duration>,

    /// Stop after N total requests across all clients
    #[arg(long = "requests", short = 'n', value_parser = parse_positive_u64)]
    pub requests: Option<PositiveU64>,

    /// Request timeout, including body transfer (supports ms/s/m/h)
    #[arg(long = "timeout", default_value = "15s", value_parser = parse_duration_arg)]
    pub request_timeout: Duration,

    /// Timeout for establishing a new connection (supports ms/s/m/h)
    #[arg(
        long = "connect-timeout",
        default_value = "5s",
        value_parser = parse_duration_arg
    )]
    pub connect_timeout: Duration,

    /// Open a fresh connection for every request
    #[arg(long = "no-keepalive")]
    pub no_keepalive: bool,

    /// Max idle pooled connections per host
    #[arg(long = "pool-max-idle")]
    pub pool_max_idle: Option<usize>,

    /// Workload: dash (manifest + segments) or plain (single endpoint)
    #[arg(long, value_enum, default_value = "dash", ignore_case = true)]
    pub mode: Mode,

    /// Endpoint appended to the URL in plain mode
    #[arg(long, default_value = "/")]
    pub endpoint: String,

    /// Size of the content directory pool (prefix1..prefixN)
    #[arg(long, default_value = "12", value_parser = parse_positive_usize)]
    pub directories: PositiveUsize,

    /// Content directory name prefix
    #[arg(long = "directory-prefix", default_value = "video-")]
    pub directory_prefix: String,

    /// Manifest file name inside each directory
    #[arg(long = "manifest-name", default_value = "manifest.mpd")]
    pub manifest_name: String,

    /// Add cache-busting query parameters and no-cache headers
    #[arg(long = "cache-bust")]
    pub cache_bust: bool,

    /// Pause between media segment requests per client (supports ms/s/m/h)
    #[arg(long, value_parser = parse_duration_arg)]
    pub pace: Option<Duration>,

    /// Log a progress line at this interval (supports ms/s/m/h)
    #[arg(long = "progress-interval", value_parser = parse_duration_arg)]
    pub progress_interval: Option<Duration>,

    /// Write the JSON result to this path
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by DASHBLAST_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable ANSI colors in log output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Path to config file (TOML/JSON). Defaults to ./dashblast.toml or ./dashblast.json if present.
    #[arg(long)]
    pub config: Option<String>,
}
