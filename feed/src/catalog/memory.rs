use std::sync::Arc;

use tokio::sync::Mutex;

use crate::catalog::CatalogReader;
use crate::error::{ErrorKind, FeedResult};
use crate::feed_error;
use crate::types::Product;

#[derive(Debug, Default)]
struct Inner {
    products: Vec<Product>,
    fail_next_read: bool,
    reads: usize,
}

/// In-memory catalog for tests and local development.
///
/// Clones share the same products, so a test can change the catalog between
/// two reconciliations.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                products,
                ..Inner::default()
            })),
        }
    }

    /// Replaces the listed products.
    pub async fn set_products(&self, products: Vec<Product>) {
        self.inner.lock().await.products = products;
    }

    /// Makes the next read fail with [`ErrorKind::SourceConnectionFailed`].
    pub async fn fail_next_read(&self) {
        self.inner.lock().await.fail_next_read = true;
    }

    /// Number of reads served so far, failed ones included.
    pub async fn reads(&self) -> usize {
        self.inner.lock().await.reads
    }
}

impl CatalogReader for MemoryCatalog {
    async fn read_active_products(&self) -> FeedResult<Vec<Product>> {
        let mut inner = self.inner.lock().await;
        inner.reads += 1;

        if std::mem::take(&mut inner.fail_next_read) {
            return Err(feed_error!(
                ErrorKind::SourceConnectionFailed,
                "Catalog database is unreachable",
                "injected failure"
            ));
        }

        Ok(inner
            .products
            .iter()
            .filter(|product| product.is_active)
            .cloned()
            .collect())
    }
}
