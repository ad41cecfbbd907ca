//! Configuration sections shared by the feed services.

mod base;
mod connection;
mod feed;
mod redis;
mod sentry;
mod sheets;
mod sync;

pub use base::*;
pub use connection::*;
pub use feed::*;
pub use redis::*;
pub use sentry::*;
pub use sheets::*;
pub use sync::*;
