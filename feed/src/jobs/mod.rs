mod runner;
mod tracker;

pub use runner::run_sync_job;
pub use tracker::JobTracker;
