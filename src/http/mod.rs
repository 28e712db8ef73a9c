//! Shared HTTP client and the request executor every worker goes through.
mod cache_bust;
mod client;
mod executor;


pub use cache_bust::{cache_busted_url, no_cache_headers};
pub use client::{DEFAULT_USER_AGENT, build_client};
pub use executor::{Exchange, RequestExecutor};
