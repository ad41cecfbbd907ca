//! Mapping of catalog products onto feed sheet rows.

mod column;
mod mapper;

pub use column::FeedColumn;
pub use mapper::{RowMapper, format_price};
