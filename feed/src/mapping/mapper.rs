use config::shared::FeedConfig;

use crate::mapping::FeedColumn;
use crate::types::Product;

/// Every listed product is active, so every feed row is in stock.
const AVAILABILITY: &str = "in_stock";

/// Maps products onto feed rows laid out like the sheet's current header row.
///
/// Mapping is pure: the same product and headers always give the same row, and
/// unknown headers map to an empty cell instead of failing.
#[derive(Debug, Clone, Default)]
pub struct RowMapper {
    profile: FeedConfig,
}

impl RowMapper {
    pub fn new(profile: FeedConfig) -> Self {
        Self { profile }
    }

    /// Returns the value of `product` for the column titled `header`.
    pub fn map_value(&self, product: &Product, header: &str) -> String {
        match FeedColumn::from_header(header) {
            Some(column) => self.map_column(product, column),
            None => String::new(),
        }
    }

    /// Returns one value per header, in header order.
    pub fn build_row(&self, product: &Product, headers: &[String]) -> Vec<String> {
        headers
            .iter()
            .map(|header| self.map_value(product, header))
            .collect()
    }

    fn map_column(&self, product: &Product, column: FeedColumn) -> String {
        let profile = &self.profile;

        match column {
            FeedColumn::Id => product.id.to_string(),
            FeedColumn::Title => product.title.clone(),
            FeedColumn::Description => product.description.clone(),
            FeedColumn::Link => product.link.clone(),
            FeedColumn::ImageLink => product.image_link.clone(),
            FeedColumn::Price => format_price(product.price, &profile.currency),
            FeedColumn::Condition => product.condition.as_str().to_string(),
            FeedColumn::Color => product.color.clone(),
            FeedColumn::Size => product.size.clone(),
            FeedColumn::AgeGroup => product.age_group.clone(),

            FeedColumn::Availability => AVAILABILITY.to_string(),
            FeedColumn::IdentifierExists => profile.identifier_exists.clone(),
            FeedColumn::Brand => profile.brand.clone(),
            FeedColumn::Adult => profile.adult.clone(),
            FeedColumn::Gender => profile.gender.clone(),
            FeedColumn::Material => profile.material.clone(),
            FeedColumn::Multipack => profile.multipack.clone(),
            FeedColumn::IsBundle => profile.is_bundle.clone(),
            FeedColumn::SellOnGoogleQuantity => profile.sell_on_google_quantity.clone(),

            FeedColumn::Gtin
            | FeedColumn::Mpn
            | FeedColumn::ProductHighlight
            | FeedColumn::ProductDetail
            | FeedColumn::AdditionalImageLink
            | FeedColumn::Pattern
            | FeedColumn::UnitPricingMeasure
            | FeedColumn::UnitPricingBaseMeasure
            | FeedColumn::EnergyEfficiencyClass
            | FeedColumn::MinEnergyEfficiencyClass
            | FeedColumn::MaxEnergyEfficiencyClass
            | FeedColumn::ItemGroupId => String::new(),
        }
    }
}

/// Renders `price` as its shortest round-trip decimal, with at least one
/// fractional digit, followed by the currency code: `1000.0 NGN`.
pub fn format_price(price: f64, currency: &str) -> String {
    format!("{price:?} {currency}")
}
