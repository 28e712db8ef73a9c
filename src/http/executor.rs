use std::error::Error as _;
use std::sync::Arc;
use std::time::Instant;

use futures_util::StreamExt;
use reqwest::header::{HeaderValue, USER_AGENT};
use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::{debug, warn};
use url::Url;

use super::cache_bust::{cache_busted_url, no_cache_headers};
use super::client::DEFAULT_USER_AGENT;
use crate::metrics::{ErrorKind, MetricsAggregator, RequestError, RequestOutcome};

/// A finished attempt that has not been recorded yet.
#[derive(Debug)]
pub struct Exchange {
    pub outcome: RequestOutcome,
    /// Present only when requested and the response was a success.
    pub body: Option<Vec<u8>>,
}

/// Sends GETs through the shared client and folds every attempt into the
/// aggregator exactly once.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    client: Client,
    aggregator: Arc<MetricsAggregator>,
    cache_bust: bool,
}

impl RequestExecutor {
    #[must_use]
    pub const fn new(client: Client, aggregator: Arc<MetricsAggregator>, cache_bust: bool) -> Self {
        Self {
            client,
            aggregator,
            cache_bust,
        }
    }

    #[must_use]
    pub fn aggregator(&self) -> &Arc<MetricsAggregator> {
        &self.aggregator
    }

    /// Fetches `url`, drains the body and records the outcome. Never fails:
    /// every failure mode comes back as a classified outcome.
    pub async fn execute(&self, url: &Url, label: &str) -> RequestOutcome {
        let exchange = self.exchange(url, label, false).await;
        self.record(&exchange.outcome);
        exchange.outcome
    }

    /// Like [`Self::execute`] but leaves recording to the caller, so a
    /// manifest attempt can be reclassified after parsing.
    pub async fn exchange(&self, url: &Url, label: &str, keep_body: bool) -> Exchange {
        let request = self.build_request(url, label);
        let started = Instant::now();
        let result = send_and_drain(request, keep_body).await;
        let latency = started.elapsed();

        match result {
            Ok((status, body)) if status.is_success() => {
                debug!(
                    "{}: {} in {:.2}ms ({})",
                    label,
                    status.as_u16(),
                    latency.as_secs_f64() * 1000.0,
                    url
                );
                Exchange {
                    outcome: RequestOutcome::success(latency),
                    body,
                }
            }
            Ok((status, _)) => {
                let error = RequestError::new(
                    ErrorKind::HttpError {
                        status: status.as_u16(),
                    },
                    status_detail(status),
                );
                warn!("{}: {} ({})", label, error, url);
                Exchange {
                    outcome: RequestOutcome::failure(latency, error),
                    body: None,
                }
            }
            Err(err) => {
                let error = RequestError::new(classify(&err), error_chain(&err));
                warn!("{}: {} ({})", label, error, url);
                Exchange {
                    outcome: RequestOutcome::failure(latency, error),
                    body: None,
                }
            }
        }
    }

    pub fn record(&self, outcome: &RequestOutcome) {
        self.aggregator.record(outcome);
    }

    fn build_request(&self, url: &Url, label: &str) -> RequestBuilder {
        let target = if self.cache_bust {
            cache_busted_url(url, &mut rand::thread_rng())
        } else {
            url.clone()
        };
        let mut request = self.client.get(target);
        if self.cache_bust {
            request = request.headers(no_cache_headers());
        }
        // Labels carry manifest-provided ids; fall back to the client default
        // when they are not a valid header value.
        if let Ok(value) = HeaderValue::from_str(&client_identifier(label)) {
            request = request.header(USER_AGENT, value);
        }
        request
    }
}

#[must_use]
pub(crate) fn client_identifier(label: &str) -> String {
    format!("{} ({})", DEFAULT_USER_AGENT, label)
}

async fn send_and_drain(
    request: RequestBuilder,
    keep_body: bool,
) -> Result<(StatusCode, Option<Vec<u8>>), reqwest::Error> {
    let response = request.send().await?;
    let status = response.status();
    let mut body = (keep_body && status.is_success()).then(Vec::new);
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        if let Some(buffer) = body.as_mut() {
            buffer.extend_from_slice(&bytes);
        }
    }
    Ok((status, body))
}

pub(super) fn classify(err: &reqwest::Error) -> ErrorKind {
    if err.is_timeout() {
        ErrorKind::Timeout
    } else if err.is_connect() || has_io_source(err) {
        ErrorKind::ConnectionError
    } else if err.is_request()
        || err.is_body()
        || err.is_decode()
        || err.is_redirect()
        || err.is_builder()
        || err.is_status()
    {
        ErrorKind::ClientError
    } else {
        ErrorKind::UnexpectedError
    }
}

/// Resets and truncated responses surface as I/O errors deep in the chain.
fn has_io_source(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(inner) = source {
        if inner.is::<std::io::Error>() {
            return true;
        }
        source = inner.source();
    }
    false
}

fn error_chain(err: &reqwest::Error) -> String {
    let mut detail = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        detail.push_str(" / ");
        detail.push_str(&inner.to_string());
        source = inner.source();
    }
    detail
}

pub(super) fn status_detail(status: StatusCode) -> String {
    let class = if status.is_client_error() {
        "client error"
    } else if status.is_server_error() {
        "server error"
    } else if status.is_redirection() {
        "redirection"
    } else {
        "informational"
    };
    format!("{} {}", status.as_u16(), class)
}
