//! CLI argument types and parsing helpers.
mod cli;
pub(crate) mod parsers;
mod types;


pub use cli::LoadArgs;
pub use types::{Mode, PositiveU64, PositiveUsize};
