mod app;
mod config;
mod http;
mod manifest;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use http::HttpError;
pub use manifest::ManifestError;
pub use validation::ValidationError;
