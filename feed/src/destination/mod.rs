mod base;
mod index;
pub mod memory;
pub mod sheets;

pub use base::Destination;
pub use index::{DestinationIndex, build_index};
