/// A feed column the mapper knows how to fill, identified by its exact header text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedColumn {
    Id,
    Title,
    Description,
    Availability,
    Link,
    ImageLink,
    Price,
    IdentifierExists,
    Gtin,
    Mpn,
    Brand,
    ProductHighlight,
    ProductDetail,
    AdditionalImageLink,
    Condition,
    Adult,
    Color,
    Size,
    Gender,
    Material,
    Pattern,
    AgeGroup,
    Multipack,
    IsBundle,
    UnitPricingMeasure,
    UnitPricingBaseMeasure,
    EnergyEfficiencyClass,
    MinEnergyEfficiencyClass,
    MaxEnergyEfficiencyClass,
    ItemGroupId,
    SellOnGoogleQuantity,
}

impl FeedColumn {
    /// Every recognised column, in the order the feed template lists them.
    pub const ALL: [FeedColumn; 31] = [
        FeedColumn::Id,
        FeedColumn::Title,
        FeedColumn::Description,
        FeedColumn::Availability,
        FeedColumn::Link,
        FeedColumn::ImageLink,
        FeedColumn::Price,
        FeedColumn::IdentifierExists,
        FeedColumn::Gtin,
        FeedColumn::Mpn,
        FeedColumn::Brand,
        FeedColumn::ProductHighlight,
        FeedColumn::ProductDetail,
        FeedColumn::AdditionalImageLink,
        FeedColumn::Condition,
        FeedColumn::Adult,
        FeedColumn::Color,
        FeedColumn::Size,
        FeedColumn::Gender,
        FeedColumn::Material,
        FeedColumn::Pattern,
        FeedColumn::AgeGroup,
        FeedColumn::Multipack,
        FeedColumn::IsBundle,
        FeedColumn::UnitPricingMeasure,
        FeedColumn::UnitPricingBaseMeasure,
        FeedColumn::EnergyEfficiencyClass,
        FeedColumn::MinEnergyEfficiencyClass,
        FeedColumn::MaxEnergyEfficiencyClass,
        FeedColumn::ItemGroupId,
        FeedColumn::SellOnGoogleQuantity,
    ];

    /// Header text of the identifier column.
    pub const ID_HEADER: &'static str = "id";

    /// Looks up a column by header text. Matching is exact and case-sensitive.
    pub fn from_header(header: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|column| column.as_str() == header)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedColumn::Id => Self::ID_HEADER,
            FeedColumn::Title => "title",
            FeedColumn::Description => "description",
            FeedColumn::Availability => "availability",
            FeedColumn::Link => "link",
            FeedColumn::ImageLink => "image link",
            FeedColumn::Price => "price",
            FeedColumn::IdentifierExists => "identifier exists",
            FeedColumn::Gtin => "gtin",
            FeedColumn::Mpn => "mpn",
            FeedColumn::Brand => "brand",
            FeedColumn::ProductHighlight => "product highlight",
            FeedColumn::ProductDetail => "product detail",
            FeedColumn::AdditionalImageLink => "additional image link",
            FeedColumn::Condition => "condition",
            FeedColumn::Adult => "adult",
            FeedColumn::Color => "color",
            FeedColumn::Size => "size",
            FeedColumn::Gender => "gender",
            FeedColumn::Material => "material",
            FeedColumn::Pattern => "pattern",
            FeedColumn::AgeGroup => "age group",
            FeedColumn::Multipack => "multipack",
            FeedColumn::IsBundle => "is bundle",
            FeedColumn::UnitPricingMeasure => "unit pricing measure",
            FeedColumn::UnitPricingBaseMeasure => "unit pricing base measure",
            FeedColumn::EnergyEfficiencyClass => "energy efficiency class",
            FeedColumn::MinEnergyEfficiencyClass => "min energy efficiency class",
            FeedColumn::MaxEnergyEfficiencyClass => "max energy efficiency class",
            FeedColumn::ItemGroupId => "item group id",
            FeedColumn::SellOnGoogleQuantity => "sell on google quantity",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_column_resolves_from_its_header() {
        for column in FeedColumn::ALL {
            assert_eq!(FeedColumn::from_header(column.as_str()), Some(column));
        }
    }

    #[test]
    fn header_matching_is_exact() {
        assert_eq!(FeedColumn::from_header("image link"), Some(FeedColumn::ImageLink));
        assert_eq!(FeedColumn::from_header("Image Link"), None);
        assert_eq!(FeedColumn::from_header(" id"), None);
        assert_eq!(FeedColumn::from_header("image_link"), None);
    }
}
