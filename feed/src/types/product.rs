use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// External identifier of a product: its SKU, trimmed of surrounding whitespace.
///
/// Both sides of a reconciliation produce identifiers through this type, so a
/// catalog SKU and a sheet cell compare equal whenever they name the same product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Returns `None` when the identifier is blank after trimming.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ProductId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Whether a product is sold new or used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    New,
    Used,
}

impl Condition {
    /// Maps the catalog's new-flag, treating a missing flag as used.
    pub fn from_new_flag(is_new: Option<bool>) -> Self {
        if is_new.unwrap_or(false) {
            Condition::New
        } else {
            Condition::Used
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::Used => "used",
        }
    }
}

/// A normalised active catalog product, ready to be mapped onto a feed row.
///
/// Nullable catalog fields have already been replaced by their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    /// Storefront page of the product.
    pub link: String,
    pub image_link: String,
    /// Non-negative, finite price in the feed currency.
    pub price: f64,
    pub condition: Condition,
    pub color: String,
    pub size: String,
    pub age_group: String,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_trimmed() {
        let id = ProductId::parse("  TS-01\t").unwrap();

        assert_eq!(id.as_str(), "TS-01");
        assert_eq!(id, ProductId::parse("TS-01").unwrap());
    }

    #[test]
    fn blank_identifiers_are_rejected() {
        assert!(ProductId::parse("").is_none());
        assert!(ProductId::parse("   ").is_none());
    }

    #[test]
    fn missing_new_flag_means_used() {
        assert_eq!(Condition::from_new_flag(Some(true)), Condition::New);
        assert_eq!(Condition::from_new_flag(Some(false)), Condition::Used);
        assert_eq!(Condition::from_new_flag(None), Condition::Used);
        assert_eq!(Condition::New.as_str(), "new");
    }
}
