use config::shared::FeedConfig;
use postgres::catalog::{ProductRow, fetch_active_product_rows};
use sqlx::PgPool;
use tracing::{debug, warn};

use crate::catalog::CatalogReader;
use crate::error::FeedResult;
use crate::types::{Condition, Product, ProductId};

/// Reads active products from the storefront's Postgres catalog.
#[derive(Debug, Clone)]
pub struct PostgresCatalogReader {
    pool: PgPool,
    profile: FeedConfig,
}

impl PostgresCatalogReader {
    pub fn new(pool: PgPool, profile: FeedConfig) -> Self {
        Self { pool, profile }
    }
}

impl CatalogReader for PostgresCatalogReader {
    async fn read_active_products(&self) -> FeedResult<Vec<Product>> {
        let rows = fetch_active_product_rows(&self.pool).await?;
        let row_count = rows.len();

        let products: Vec<Product> = rows
            .into_iter()
            .filter_map(|row| normalize_product_row(row, &self.profile))
            .collect();

        debug!(
            rows = row_count,
            products = products.len(),
            "read active products from catalog"
        );

        Ok(products)
    }
}

/// Turns a raw catalog row into a [`Product`], filling in defaults for missing values.
///
/// Rows without a SKU cannot be matched against the sheet and are skipped.
pub fn normalize_product_row(row: ProductRow, profile: &FeedConfig) -> Option<Product> {
    let Some(id) = row.sku.as_deref().and_then(ProductId::parse) else {
        warn!(title = ?row.title, "skipping catalog product without sku");
        return None;
    };

    let price = match row.price {
        Some(price) if price.is_finite() && price >= 0.0 => price,
        Some(price) => {
            warn!(%id, price, "catalog price is not a valid amount, using 0");
            0.0
        }
        None => 0.0,
    };

    let image_link = row
        .image_url
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| profile.placeholder_image_url.clone());

    Some(Product {
        link: profile.product_link(id.as_str()),
        id,
        title: row.title.unwrap_or_default(),
        description: row.description.unwrap_or_default(),
        image_link,
        price,
        condition: Condition::from_new_flag(row.is_new),
        color: row.color.unwrap_or_default(),
        size: row.size.unwrap_or_default(),
        age_group: row.age_group.unwrap_or_default(),
        is_active: row.is_active,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(sku: Option<&str>) -> ProductRow {
        ProductRow {
            sku: sku.map(str::to_string),
            title: Some("Linen Dress".to_string()),
            description: None,
            price: None,
            color: None,
            size: Some("M".to_string()),
            age_group: None,
            image_url: None,
            is_new: None,
            is_active: true,
        }
    }

    #[test]
    fn missing_values_degrade_to_defaults() {
        let profile = FeedConfig::default();

        let product = normalize_product_row(row(Some(" LD-7 ")), &profile).unwrap();

        assert_eq!(product.id.as_str(), "LD-7");
        assert_eq!(product.description, "");
        assert_eq!(product.price, 0.0);
        assert_eq!(product.color, "");
        assert_eq!(product.size, "M");
        assert_eq!(product.condition, Condition::Used);
        assert_eq!(product.image_link, "https://www.revoque.com.ng/placeholder.jpg");
        assert_eq!(product.link, "https://www.revoque.com.ng/products/LD-7");
    }

    #[test]
    fn present_values_are_kept() {
        let profile = FeedConfig::default();
        let mut raw = row(Some("LD-8"));
        raw.price = Some(1500.5);
        raw.image_url = Some("https://cdn.example/ld-8.jpg".to_string());
        raw.is_new = Some(true);

        let product = normalize_product_row(raw, &profile).unwrap();

        assert_eq!(product.price, 1500.5);
        assert_eq!(product.image_link, "https://cdn.example/ld-8.jpg");
        assert_eq!(product.condition, Condition::New);
    }

    #[test]
    fn invalid_prices_become_zero() {
        let profile = FeedConfig::default();
        let mut negative = row(Some("A"));
        negative.price = Some(-3.0);
        let mut not_a_number = row(Some("B"));
        not_a_number.price = Some(f64::NAN);

        assert_eq!(normalize_product_row(negative, &profile).unwrap().price, 0.0);
        assert_eq!(normalize_product_row(not_a_number, &profile).unwrap().price, 0.0);
    }

    #[test]
    fn rows_without_sku_are_skipped() {
        let profile = FeedConfig::default();

        assert!(normalize_product_row(row(None), &profile).is_none());
        assert!(normalize_product_row(row(Some("  ")), &profile).is_none());
    }
}
