//! Core data types shared across the feed synchronisation stages.

mod cell;
mod job;
mod product;
mod summary;

pub use cell::{Cell, SheetRecord};
pub use job::{JobId, JobRecord, JobStatus, JobUpdate};
pub use product::{Condition, Product, ProductId};
pub use summary::{ReconcileOutcome, SyncSummary};
