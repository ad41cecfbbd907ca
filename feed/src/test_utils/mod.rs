//! Fixtures and in-memory wiring for tests of the feed and of services built on it.

pub mod fixtures;
pub mod pipeline;

pub use fixtures::{default_headers, product, products};
