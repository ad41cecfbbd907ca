//! Coordination primitives shared by background workers.

pub mod shutdown;
