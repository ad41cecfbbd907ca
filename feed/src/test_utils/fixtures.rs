use config::shared::FeedConfig;

use crate::mapping::FeedColumn;
use crate::types::{Condition, Product, ProductId};

/// Returns an active product whose fields derive from `id`, titled `Product {id}`.
pub fn product(id: &str) -> Product {
    let profile = FeedConfig::default();

    Product {
        id: ProductId::parse(id).expect("fixture product ids are not blank"),
        title: format!("Product {id}"),
        description: format!("Description of {id}"),
        link: profile.product_link(id),
        image_link: format!("https://cdn.example.com/{id}.jpg"),
        price: 1000.0,
        condition: Condition::New,
        color: "Black".to_string(),
        size: "M".to_string(),
        age_group: "adult".to_string(),
        is_active: true,
    }
}

/// Returns one active [`product`] per id, in order.
pub fn products(ids: &[&str]) -> Vec<Product> {
    ids.iter().map(|id| product(id)).collect()
}

/// Returns the header row of the full feed template.
pub fn default_headers() -> Vec<String> {
    FeedColumn::ALL
        .iter()
        .map(|column| column.as_str().to_string())
        .collect()
}
