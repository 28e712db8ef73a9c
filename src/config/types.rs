use std::time::Duration;

use serde::Deserialize;

use crate::args::Mode;
use crate::args::parsers::parse_duration;
use crate::error::ValidationError;

/// Every field is optional; command-line values win.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub concurrency: Option<usize>,
    pub duration: Option<DurationValue>,
    pub requests: Option<u64>,
    pub timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub keepalive: Option<bool>,
    pub pool_max_idle: Option<usize>,
    pub mode: Option<Mode>,
    pub endpoint: Option<String>,
    pub directories: Option<usize>,
    pub directory_prefix: Option<String>,
    pub manifest_name: Option<String>,
    pub cache_bust: Option<bool>,
    pub pace: Option<DurationValue>,
    pub progress_interval: Option<DurationValue>,
    pub output: Option<String>,
}

/// `30` (seconds) or `"250ms"`, `"2m"`, ...
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err(ValidationError::DurationZero)
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => parse_duration(text),
        }
    }
}
