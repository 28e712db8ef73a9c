pub mod run;

pub use run::{DirectoryPool, RunConfig, WorkloadMode};
