//! Reconciles an e-commerce catalog into a Google Merchant Center feed sheet.
//!
//! A [`reconcile::Reconciler`] reads active products through a
//! [`catalog::CatalogReader`], maps them onto the sheet's header row with a
//! [`mapping::RowMapper`], and inserts, updates and deletes rows through a
//! [`destination::Destination`] so that the sheet lists exactly the active
//! catalog. Runs are serialised by a [`lock::SyncLock`] and may be tracked as
//! jobs by a [`jobs::JobTracker`].

mod macros;

pub mod catalog;
pub mod concurrency;
pub mod destination;
pub mod error;
pub mod jobs;
pub mod lock;
pub mod mapping;
pub mod reconcile;
pub mod store;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;
pub mod workers;
