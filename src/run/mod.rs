//! Run orchestration: shared context, coordinator and progress observer.
mod context;
mod coordinator;
mod progress;

#[cfg(test)]
mod tests;

pub use context::{RequestBudget, RunContext, StopReason};
pub use coordinator::Coordinator;
pub use progress::{progress_line, spawn_progress_observer};
