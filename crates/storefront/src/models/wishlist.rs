//! Wishlist types.

use serde::Serialize;

use ironmonger_core::{ProductId, UserId};

use super::product::Product;

/// Wishlist response body. Entries whose product no longer exists are dropped.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistView {
    pub user_id: UserId,
    pub products: Vec<Product>,
}

impl WishlistView {
    /// Resolve product ids in wishlist order.
    #[must_use]
    pub fn build(user_id: UserId, ids: &[ProductId], products: &[Product]) -> Self {
        let products = ids
            .iter()
            .filter_map(|id| products.iter().find(|p| p.id == *id).cloned())
            .collect();
        Self { user_id, products }
    }
}
