use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Serialize;
use url::Url;

use crate::error::{AppError, AppResult, HttpError, ValidationError};
use crate::metrics::HistogramLayout;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_DIRECTORY_COUNT: usize = 12;
pub const DEFAULT_DIRECTORY_PREFIX: &str = "video-";
pub const DEFAULT_MANIFEST_NAME: &str = "manifest.mpd";
pub const DEFAULT_ENDPOINT: &str = "/";

/// What each worker requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadMode {
    /// Manifest, init segments once, then media segments in a loop.
    Dash,
    /// Repeated GETs of a single endpoint.
    Plain,
}

impl WorkloadMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            WorkloadMode::Dash => "dash",
            WorkloadMode::Plain => "plain",
        }
    }
}

/// Virtual content directories `{prefix}1 ..= {prefix}{count}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryPool {
    prefix: String,
    count: NonZeroUsize,
    manifest_name: String,
}

impl DirectoryPool {
    /// # Errors
    ///
    /// Returns an error when the prefix or manifest name is blank.
    pub fn new(prefix: String, count: NonZeroUsize, manifest_name: String) -> AppResult<Self> {
        if prefix.trim().is_empty() {
            return Err(AppError::validation(ValidationError::DirectoryPrefixEmpty));
        }
        if manifest_name.trim().is_empty() {
            return Err(AppError::validation(ValidationError::ManifestNameEmpty));
        }
        Ok(Self {
            prefix,
            count,
            manifest_name,
        })
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub const fn count(&self) -> NonZeroUsize {
        self.count
    }

    #[must_use]
    pub fn manifest_name(&self) -> &str {
        &self.manifest_name
    }

    /// Directory name for a 1-based index.
    #[must_use]
    pub fn directory(&self, number: usize) -> String {
        format!("{}{}", self.prefix, number)
    }

    /// `{base}/{directory}/{manifest_name}`, keeping any base path.
    ///
    /// # Errors
    ///
    /// Returns an error when the joined URL is invalid.
    pub fn manifest_url(&self, base: &Url, directory: &str) -> AppResult<Url> {
        let relative = format!("{}/{}", directory, self.manifest_name);
        join_relative(base, &relative)
    }
}

impl Default for DirectoryPool {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_DIRECTORY_PREFIX.to_owned(),
            count: NonZeroUsize::new(DEFAULT_DIRECTORY_COUNT).unwrap_or(NonZeroUsize::MIN),
            manifest_name: DEFAULT_MANIFEST_NAME.to_owned(),
        }
    }
}

/// Joins `relative` under `base`, treating `base` as a directory.
///
/// # Errors
///
/// Returns an error when the joined URL is invalid.
pub fn join_relative(base: &Url, relative: &str) -> AppResult<Url> {
    let mut directory = base.clone();
    if !directory.path().ends_with('/') {
        let path = format!("{}/", directory.path());
        directory.set_path(&path);
    }
    directory
        .join(relative.trim_start_matches('/'))
        .map_err(|err| {
            AppError::http(HttpError::JoinUrlFailed {
                url: relative.to_owned(),
                source: err,
            })
        })
}

/// Everything the coordinator needs for one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunConfig {
    #[serde(serialize_with = "serialize_url")]
    pub target_url: Url,
    pub concurrency: NonZeroUsize,
    #[serde(serialize_with = "serialize_opt_secs")]
    pub duration: Option<Duration>,
    pub max_requests: Option<u64>,
    #[serde(serialize_with = "serialize_secs")]
    pub request_timeout: Duration,
    #[serde(serialize_with = "serialize_secs")]
    pub connect_timeout: Duration,
    pub keep_alive: bool,
    pub pool_max_idle_per_host: Option<usize>,
    pub mode: WorkloadMode,
    pub endpoint: String,
    pub directories: DirectoryPool,
    pub cache_bust: bool,
    #[serde(serialize_with = "serialize_opt_secs")]
    pub pace: Option<Duration>,
    #[serde(serialize_with = "serialize_opt_secs")]
    pub progress_interval: Option<Duration>,
    #[serde(skip)]
    pub histogram: HistogramLayout,
}

impl RunConfig {
    /// Defaults for everything but the target.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL is not an http(s) base URL.
    pub fn new(target_url: &str) -> AppResult<Self> {
        Ok(Self {
            target_url: parse_target_url(target_url)?,
            concurrency: NonZeroUsize::MIN,
            duration: None,
            max_requests: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            keep_alive: true,
            pool_max_idle_per_host: None,
            mode: WorkloadMode::Dash,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            directories: DirectoryPool::default(),
            cache_bust: false,
            pace: None,
            progress_interval: None,
            histogram: HistogramLayout::default(),
        })
    }

    /// URL hit by every request in plain mode.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint cannot be joined onto the target.
    pub fn plain_url(&self) -> AppResult<Url> {
        join_relative(&self.target_url, &self.endpoint)
    }
}

/// # Errors
///
/// Returns an error when the URL is malformed, not http(s), or cannot be a
/// base URL.
pub fn parse_target_url(value: &str) -> AppResult<Url> {
    let url = Url::parse(value).map_err(|err| {
        AppError::validation(ValidationError::InvalidUrl {
            url: value.to_owned(),
            source: err,
        })
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::validation(ValidationError::UnsupportedScheme {
            url: value.to_owned(),
        }));
    }
    if url.cannot_be_a_base() {
        return Err(AppError::validation(ValidationError::CannotBeBase {
            url: value.to_owned(),
        }));
    }
    Ok(url)
}

fn serialize_url<S: serde::Serializer>(url: &Url, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(url.as_str())
}

fn serialize_secs<S: serde::Serializer>(
    value: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(value.as_secs_f64())
}

fn serialize_opt_secs<S: serde::Serializer>(
    value: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(duration) => serializer.serialize_some(&duration.as_secs_f64()),
        None => serializer.serialize_none(),
    }
}
