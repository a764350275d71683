//! Cart aggregate.
//!
//! One cart per shopper. Lines merge on `(product, selected size)`; the total
//! is a pure function of the lines and is recomputed after every mutation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use ironmonger_core::{CartLineId, LineTarget, ProductId, SizeId, UserId, line_total, sum_lines};

use super::product::{Product, SizeVariant};

/// One line of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartLineId,
    pub product_id: ProductId,
    /// Always at least 1.
    pub quantity: u32,
    /// Unit price captured when the line was first added.
    pub price: Decimal,
    pub selected_size: Option<SizeId>,
}

impl CartItem {
    /// Whether this line has the given merge identity.
    #[must_use]
    pub fn is_line_for(&self, product_id: ProductId, size: Option<SizeId>) -> bool {
        self.product_id == product_id && self.selected_size == size
    }

    #[must_use]
    pub fn line_total(&self) -> Decimal {
        line_total(self.price, self.quantity)
    }
}

/// A shopper's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    user_id: UserId,
    items: Vec<CartItem>,
    total: Decimal,
    updated_at: DateTime<Utc>,
}

impl Cart {
    /// A fresh cart with no lines.
    #[must_use]
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            total: Decimal::ZERO,
            updated_at: Utc::now(),
        }
    }

    /// Rebuild a cart from stored lines. The total is derived, never loaded.
    #[must_use]
    pub fn from_parts(user_id: UserId, items: Vec<CartItem>, updated_at: DateTime<Utc>) -> Self {
        let mut cart = Self {
            user_id,
            items,
            total: Decimal::ZERO,
            updated_at,
        };
        cart.total = cart.compute_total();
        cart
    }

    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub const fn total(&self) -> Decimal {
        self.total
    }

    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add `quantity` of a product and return the id of the affected line.
    ///
    /// An existing line with the same `(product, size)` gets its quantity
    /// bumped and keeps its original price snapshot. Otherwise a new line is
    /// appended at `unit_price`.
    pub fn add(
        &mut self,
        product_id: ProductId,
        quantity: u32,
        unit_price: Decimal,
        size: Option<SizeId>,
    ) -> CartLineId {
        let line = if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.is_line_for(product_id, size))
        {
            item.quantity = item.quantity.saturating_add(quantity);
            item.id
        } else {
            let id = CartLineId::generate();
            self.items.push(CartItem {
                id,
                product_id,
                quantity,
                price: unit_price,
                selected_size: size,
            });
            id
        };
        self.touch();
        line
    }

    /// Find the line an update applies to.
    ///
    /// With a size the full merge identity must match; without one the first
    /// line for the product is used.
    #[must_use]
    pub fn find_line(&self, product_id: ProductId, size: Option<SizeId>) -> Option<&CartItem> {
        match size {
            Some(_) => self
                .items
                .iter()
                .find(|item| item.is_line_for(product_id, size)),
            None => self.items.iter().find(|item| item.product_id == product_id),
        }
    }

    /// Overwrite the quantity of one line. Returns `false` if the line is gone.
    pub fn set_quantity(&mut self, line: CartLineId, quantity: u32) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == line) else {
            return false;
        };
        item.quantity = quantity;
        self.touch();
        true
    }

    /// Drop every line matching the target. Returns how many were removed.
    pub fn remove(&mut self, target: LineTarget) -> usize {
        let before = self.items.len();
        self.items.retain(|item| match target {
            LineTarget::Product(product_id) => item.product_id != product_id,
            LineTarget::Line(line) => item.id != line,
        });
        let removed = before - self.items.len();
        self.touch();
        removed
    }

    /// Empty the cart. The cart itself keeps existing.
    pub fn clear(&mut self) {
        self.items.clear();
        self.touch();
    }

    fn compute_total(&self) -> Decimal {
        sum_lines(self.items.iter().map(|item| (item.price, item.quantity)))
    }

    fn touch(&mut self) {
        self.total = self.compute_total();
        self.updated_at = Utc::now();
    }
}

/// Cart line with its product resolved for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub id: CartLineId,
    pub product_id: ProductId,
    /// `None` when the product has since been removed from the catalog.
    pub product: Option<Product>,
    pub quantity: u32,
    pub price: Decimal,
    pub selected_size: Option<SizeVariant>,
    pub line_total: Decimal,
}

/// Cart response body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub user_id: UserId,
    pub items: Vec<CartItemView>,
    pub total: Decimal,
    pub item_count: u32,
}

impl CartView {
    /// Pair cart lines with whatever products could be resolved.
    #[must_use]
    pub fn build(cart: &Cart, products: &[Product]) -> Self {
        let items = cart
            .items()
            .iter()
            .map(|item| {
                let product = products.iter().find(|p| p.id == item.product_id);
                CartItemView {
                    id: item.id,
                    product_id: item.product_id,
                    selected_size: item
                        .selected_size
                        .and_then(|size| product.and_then(|p| p.size(size)).cloned()),
                    product: product.cloned(),
                    quantity: item.quantity,
                    price: item.price,
                    line_total: item.line_total(),
                }
            })
            .collect();

        Self {
            user_id: cart.user_id(),
            items,
            total: cart.total(),
            item_count: cart
                .items()
                .iter()
                .fold(0_u32, |acc, item| acc.saturating_add(item.quantity)),
        }
    }
}
