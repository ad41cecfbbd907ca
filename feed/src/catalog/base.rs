use std::future::Future;

use crate::error::FeedResult;
use crate::types::Product;

/// Source of the products that should be listed in the feed.
///
/// Implementations return active products only, normalised so that every
/// nullable field already holds its default. The returned order is stable
/// between calls and determines the order of appended and updated rows.
pub trait CatalogReader {
    /// Reads all active products.
    fn read_active_products(&self) -> impl Future<Output = FeedResult<Vec<Product>>> + Send;
}
