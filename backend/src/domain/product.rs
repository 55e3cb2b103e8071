//! Catalogue product entity and value types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Stable product identifier stored as a UUID.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct ProductId(Uuid);

impl ProductId {
    /// Wrap an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Fixed catalogue categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Smartphones,
    Laptops,
    Tablets,
    Accessories,
    Wearables,
}

impl Category {
    /// Stable string form used in storage and on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Smartphones => "smartphones",
            Self::Laptops => "laptops",
            Self::Tablets => "tablets",
            Self::Accessories => "accessories",
            Self::Wearables => "wearables",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown category string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct CategoryParseError(pub String);

impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "smartphones" => Ok(Self::Smartphones),
            "laptops" => Ok(Self::Laptops),
            "tablets" => Ok(Self::Tablets),
            "accessories" => Ok(Self::Accessories),
            "wearables" => Ok(Self::Wearables),
            other => Err(CategoryParseError(other.to_owned())),
        }
    }
}

/// A sellable catalogue entry.
///
/// ## Invariants
/// - `price` is non-negative.
/// - `stock` is never negative; it is mutated only inside the placement and
///   cancellation transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Stable identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Unit price.
    pub price: Decimal,
    /// Catalogue category.
    pub category: Category,
    /// Image URL.
    pub image: String,
    /// Whether the product is highlighted on the storefront.
    pub featured: bool,
    /// Sellable units on hand.
    pub stock: i32,
    /// Inactive products are invisible to shoppers.
    pub active: bool,
    /// Manufacturer brand; may be empty.
    pub brand: String,
    /// Manufacturer model; may be empty.
    pub model: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Sort orders accepted by the public catalogue listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ProductSort {
    /// Most recently created first.
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

/// Error returned when parsing an unknown sort string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown product sort: {0}")]
pub struct ProductSortParseError(pub String);

impl FromStr for ProductSort {
    type Err = ProductSortParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(Self::Newest),
            "price-asc" => Ok(Self::PriceAsc),
            "price-desc" => Ok(Self::PriceDesc),
            "name-asc" => Ok(Self::NameAsc),
            "name-desc" => Ok(Self::NameDesc),
            other => Err(ProductSortParseError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("smartphones", Category::Smartphones)]
    #[case("laptops", Category::Laptops)]
    #[case("tablets", Category::Tablets)]
    #[case("accessories", Category::Accessories)]
    #[case("wearables", Category::Wearables)]
    fn category_round_trips(#[case] raw: &str, #[case] category: Category) {
        assert_eq!(raw.parse::<Category>().ok(), Some(category));
        assert_eq!(category.as_str(), raw);
    }

    #[rstest]
    #[case("price-asc", ProductSort::PriceAsc)]
    #[case("name-desc", ProductSort::NameDesc)]
    #[case("newest", ProductSort::Newest)]
    fn sort_parses(#[case] raw: &str, #[case] sort: ProductSort) {
        assert_eq!(raw.parse::<ProductSort>().ok(), Some(sort));
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!("groceries".parse::<Category>().is_err());
    }
}
