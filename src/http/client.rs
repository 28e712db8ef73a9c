use std::time::Duration;

use reqwest::Client;
use tracing::error;

use crate::domain::RunConfig;
use crate::error::{AppError, AppResult, HttpError};

pub const DEFAULT_USER_AGENT: &str = concat!("dashblast/", env!("CARGO_PKG_VERSION"));

/// One connection pool for the whole run.
///
/// # Errors
///
/// Returns an error when the client cannot be constructed (for example when
/// the TLS backend fails to initialize).
pub fn build_client(config: &RunConfig) -> AppResult<Client> {
    let mut client_builder = Client::builder()
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(DEFAULT_USER_AGENT);

    if !config.keep_alive {
        client_builder = client_builder
            .pool_max_idle_per_host(0)
            .pool_idle_timeout(Some(Duration::from_secs(0)));
    } else if let Some(max_idle) = config.pool_max_idle_per_host {
        client_builder = client_builder.pool_max_idle_per_host(max_idle);
    }

    match client_builder.build() {
        Ok(client) => Ok(client),
        Err(err) => {
            error!("Failed to build HTTP client: {}", err);
            Err(AppError::http(HttpError::BuildClientFailed { source: err }))
        }
    }
}
