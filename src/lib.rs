//! Core library for the `dashblast` CLI.
//!
//! `dashblast` simulates many concurrent MPEG-DASH clients against one
//! origin or load balancer. Each client picks a content directory, fetches
//! and parses its manifest, downloads the initialization segments and then
//! loops over the media segments until the run stops. Every request feeds a
//! shared fixed-memory aggregator that produces the final latency and error
//! statistics. The library also carries a plain mode that repeatedly hits a
//! single endpoint.
pub mod adapters;
pub mod args;
pub mod config;
pub mod dash;
pub mod domain;
pub mod entry;
pub mod error;
pub mod http;
pub mod logger;
pub mod metrics;
pub mod report;
pub mod run;
pub mod shutdown;
pub mod shutdown_handlers;
pub mod worker;

#[cfg(test)]
mod test_support;
