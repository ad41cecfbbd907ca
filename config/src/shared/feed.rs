use serde::Deserialize;

use crate::shared::ValidationError;

/// Merchant profile: the fixed values written into every feed row.
///
/// All fields default to the storefront's current profile, so the section can
/// be omitted entirely.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Currency code appended to prices, e.g. `1000.0 NGN`.
    pub currency: String,
    /// Storefront URL products are linked under as `{product_link_base}/{sku}`.
    pub product_link_base: String,
    /// Image used for products without one.
    pub placeholder_image_url: String,
    pub brand: String,
    pub gender: String,
    pub material: String,
    pub identifier_exists: String,
    pub adult: String,
    pub multipack: String,
    pub is_bundle: String,
    pub sell_on_google_quantity: String,
}

impl FeedConfig {
    pub const DEFAULT_CURRENCY: &'static str = "NGN";

    pub const DEFAULT_PRODUCT_LINK_BASE: &'static str = "https://www.revoque.com.ng/products";

    pub const DEFAULT_PLACEHOLDER_IMAGE_URL: &'static str =
        "https://www.revoque.com.ng/placeholder.jpg";

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.currency.trim().is_empty() {
            return Err(ValidationError::EmptyField("feed.currency"));
        }
        if self.product_link_base.trim().is_empty() {
            return Err(ValidationError::EmptyField("feed.product_link_base"));
        }

        Ok(())
    }

    /// Storefront link of the product with the given SKU.
    pub fn product_link(&self, sku: &str) -> String {
        format!("{}/{sku}", self.product_link_base.trim_end_matches('/'))
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            currency: Self::DEFAULT_CURRENCY.to_string(),
            product_link_base: Self::DEFAULT_PRODUCT_LINK_BASE.to_string(),
            placeholder_image_url: Self::DEFAULT_PLACEHOLDER_IMAGE_URL.to_string(),
            brand: "Revoque".to_string(),
            gender: "female".to_string(),
            material: "100% Cotton".to_string(),
            identifier_exists: "no".to_string(),
            adult: "no".to_string(),
            multipack: "1".to_string(),
            is_bundle: "no".to_string(),
            sell_on_google_quantity: "1".to_string(),
        }
    }
}
