//! Catalog product types.
//!
//! The catalog is read-only from the storefront's point of view except for
//! stock, which only the order commit touches.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ironmonger_core::{ProductId, ProductStatus, SizeId, SizeSelector};

/// A named sub-SKU of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeVariant {
    pub id: SizeId,
    /// Display name, e.g. "12 x 8 inch".
    pub name: String,
    /// Short value, e.g. "12x8". May be empty.
    pub value: String,
    /// Owning product, when the variant was created for a single product.
    pub product_id: Option<ProductId>,
    pub status: ProductStatus,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    /// Current unit price (never negative).
    pub price: Decimal,
    /// Units on hand (never negative).
    pub stock: u32,
    pub sizes: Vec<SizeVariant>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether `quantity` units can be taken right now.
    #[must_use]
    pub const fn has_stock(&self, quantity: u32) -> bool {
        self.stock >= quantity
    }

    /// Find the size variant a selector points at.
    #[must_use]
    pub fn find_size(&self, selector: &SizeSelector) -> Option<&SizeVariant> {
        self.sizes
            .iter()
            .find(|size| selector.matches(size.id, &size.name, &size.value))
    }

    /// Look up a variant by id.
    #[must_use]
    pub fn size(&self, id: SizeId) -> Option<&SizeVariant> {
        self.sizes.iter().find(|size| size.id == id)
    }
}

/// New product for seeding the catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub sizes: Vec<NewSize>,
}

/// New size variant for seeding.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSize {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bolt() -> Product {
        Product {
            id: ProductId::new(1),
            name: "Hex bolt".to_owned(),
            description: None,
            price: Decimal::new(250, 2),
            stock: 3,
            sizes: vec![SizeVariant {
                id: SizeId::new(10),
                name: "M8 x 40".to_owned(),
                value: "m8x40".to_owned(),
                product_id: Some(ProductId::new(1)),
                status: ProductStatus::Active,
            }],
            status: ProductStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_has_stock() {
        let product = bolt();
        assert!(product.has_stock(3));
        assert!(!product.has_stock(4));
    }

    #[test]
    fn test_find_size() {
        let product = bolt();
        assert!(product.find_size(&SizeSelector::Id(SizeId::new(10))).is_some());
        assert!(product.find_size(&SizeSelector::Name("M8X40".to_owned())).is_some());
        assert!(product.find_size(&SizeSelector::Name("M10".to_owned())).is_none());
    }
}
