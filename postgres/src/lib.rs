//! Read access to the storefront catalog database.

pub mod catalog;
mod db;

pub use db::lazy_catalog_pool;

#[cfg(feature = "test-utils")]
pub mod test_utils;
