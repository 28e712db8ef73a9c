//! One simulated streaming client per task.
mod cursor;
mod state;


pub use cursor::MediaCursor;
pub use state::{ClientWorker, WorkerState, pick_directory};
