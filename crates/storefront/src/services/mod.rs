//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `cart` - Cart aggregate: add, update, remove, clear
//! - `orders` - Order placement and the privileged order views
//! - `addresses` - Address book with a single default per shopper
//! - `wishlist` - Per-shopper product set
//! - `tokens` - Bearer token generation and hashing
//!
//! Every service borrows a store and takes the caller's identity as an
//! explicit argument.

pub mod addresses;
pub mod cart;
mod error;
pub mod orders;
pub mod tokens;
pub mod wishlist;

pub use addresses::AddressService;
pub use cart::{CartService, Removal};
pub use error::CommerceError;
pub use orders::{OrderService, PlaceOrder, RequestedItem};
pub use wishlist::WishlistService;

/// Validate a client-supplied quantity.
///
/// Quantities must be at least 1 and fit the storage column.
pub(crate) fn checked_quantity(raw: i64) -> Result<u32, CommerceError> {
    if raw < 1 {
        return Err(CommerceError::invalid("Quantity must be at least 1"));
    }
    i32::try_from(raw)
        .ok()
        .and_then(|q| u32::try_from(q).ok())
        .ok_or_else(|| CommerceError::invalid("Quantity is too large"))
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use ironmonger_core::{ProductId, ProductStatus, Role, SizeId, UserId};

    use crate::db::MemoryStore;
    use crate::models::{Product, SizeVariant};

    pub fn dec(units: i64) -> Decimal {
        Decimal::new(units, 0)
    }

    pub async fn shopper(store: &MemoryStore) -> UserId {
        store
            .insert_shopper("Test Shopper", "shopper@example.com", Role::Customer)
            .await
    }

    pub fn product(name: &str, price: i64, stock: u32) -> Product {
        product_with_sizes(name, price, stock, &[])
    }

    pub fn product_with_sizes(
        name: &str,
        price: i64,
        stock: u32,
        sizes: &[(i32, &str)],
    ) -> Product {
        Product {
            id: ProductId::new(0),
            name: name.to_owned(),
            description: None,
            price: dec(price),
            stock,
            sizes: sizes
                .iter()
                .map(|(id, size)| SizeVariant {
                    id: SizeId::new(*id),
                    name: (*size).to_owned(),
                    value: String::new(),
                    product_id: None,
                    status: ProductStatus::Active,
                })
                .collect(),
            status: ProductStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_quantity() {
        assert_eq!(checked_quantity(1).ok(), Some(1));
        assert_eq!(checked_quantity(250).ok(), Some(250));
        assert!(matches!(checked_quantity(0), Err(CommerceError::InvalidInput(_))));
        assert!(matches!(checked_quantity(-3), Err(CommerceError::InvalidInput(_))));
        assert!(checked_quantity(i64::from(i32::MAX) + 1).is_err());
    }
}
