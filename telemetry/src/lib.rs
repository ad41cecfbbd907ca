//! Logging setup shared by the feed binaries and their tests.

pub mod tracing;
