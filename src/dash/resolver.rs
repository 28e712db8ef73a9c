use tracing::{info, warn};
use url::Url;

use super::manifest::parse_manifest;
use super::types::SegmentDescriptor;
use crate::error::ManifestError;
use crate::http::RequestExecutor;
use crate::metrics::{ErrorKind, RequestError, RequestOutcome};

/// Fetches and parses manifests through the shared executor.
///
/// Each call issues exactly one request and records exactly one outcome: the
/// executor's classification when the fetch fails, `ManifestParseError` when
/// the body does not parse, a success otherwise.
#[derive(Debug, Clone, Copy)]
pub struct ManifestResolver<'a> {
    executor: &'a RequestExecutor,
}

impl<'a> ManifestResolver<'a> {
    #[must_use]
    pub const fn new(executor: &'a RequestExecutor) -> Self {
        Self { executor }
    }

    /// # Errors
    ///
    /// Returns [`ManifestError::Fetch`] when the request fails and a parse
    /// error when the body is not a DASH manifest.
    pub async fn resolve(
        &self,
        manifest_url: &Url,
        label: &str,
    ) -> Result<Vec<SegmentDescriptor>, ManifestError> {
        let exchange = self.executor.exchange(manifest_url, label, true).await;
        let latency = exchange.outcome.latency;
        if let Some(error) = exchange.outcome.error.as_ref() {
            self.executor.record(&exchange.outcome);
            return Err(ManifestError::Fetch {
                url: manifest_url.to_string(),
                reason: error.to_string(),
            });
        }

        let body = exchange.body.unwrap_or_default();
        let text = String::from_utf8_lossy(&body);
        match parse_manifest(&text, manifest_url) {
            Ok(segments) => {
                self.executor.record(&exchange.outcome);
                info!(
                    "{}: parsed {} segments from {}",
                    label,
                    segments.len(),
                    manifest_url
                );
                Ok(segments)
            }
            Err(err) => {
                let error = RequestError::new(ErrorKind::ManifestParseError, err.to_string());
                warn!("{}: {} ({})", label, error, manifest_url);
                self.executor
                    .record(&RequestOutcome::failure(latency, error));
                Err(err)
            }
        }
    }
}
