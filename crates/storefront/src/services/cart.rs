//! Cart operations.
//!
//! Stock is only read here, never changed; the order commit owns stock.

use tracing::{debug, instrument};

use ironmonger_core::{LineTarget, ProductId, SizeId, SizeSelector, UserId};

use super::{CommerceError, checked_quantity};
use crate::db::{CartStore, CatalogStore};
use crate::models::{Cart, CartView, Product};

/// Outcome of a removal request. Both outcomes are successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed(usize),
    NothingMatched,
}

/// Cart service for one store.
pub struct CartService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> CartService<'a, S>
where
    S: CatalogStore + CartStore + ?Sized,
{
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Load the shopper's cart, creating and persisting an empty one if needed.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` on storage failure.
    pub async fn load(&self, shopper: UserId) -> Result<Cart, CommerceError> {
        if let Some(cart) = self.store.find_cart(shopper).await? {
            return Ok(cart);
        }
        let cart = Cart::empty(shopper);
        self.store.save_cart(&cart).await?;
        debug!(shopper_id = %shopper, "Created empty cart");
        Ok(cart)
    }

    /// Resolve products for display.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` on storage failure.
    pub async fn view(&self, cart: &Cart) -> Result<CartView, CommerceError> {
        let mut ids: Vec<ProductId> = cart.items().iter().map(|item| item.product_id).collect();
        ids.sort_unstable();
        ids.dedup();
        let products = self.store.find_products(&ids).await?;
        Ok(CartView::build(cart, &products))
    }

    /// # Errors
    ///
    /// Returns `CommerceError::Repository` on storage failure.
    #[instrument(skip(self), fields(shopper_id = %shopper))]
    pub async fn get(&self, shopper: UserId) -> Result<CartView, CommerceError> {
        let cart = self.load(shopper).await?;
        self.view(&cart).await
    }

    /// Add `quantity` (default 1) of a product, merging with an existing line
    /// for the same product and size.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::InvalidInput` for a quantity below 1 or an
    /// unknown size, `CommerceError::NotFound` if the product is missing and
    /// `CommerceError::InsufficientStock` if stock is below `quantity`.
    #[instrument(skip(self, size), fields(shopper_id = %shopper, product_id = %product_id))]
    pub async fn add_item(
        &self,
        shopper: UserId,
        product_id: ProductId,
        quantity: Option<i64>,
        size: Option<&SizeSelector>,
    ) -> Result<CartView, CommerceError> {
        let quantity = checked_quantity(quantity.unwrap_or(1))?;

        let product = self
            .store
            .find_product(product_id)
            .await?
            .ok_or_else(|| CommerceError::not_found("Product not found"))?;

        if !product.has_stock(quantity) {
            return Err(CommerceError::InsufficientStock {
                product: product.name,
            });
        }

        let size = resolve_size(&product, size)?;

        let mut cart = self.load(shopper).await?;
        let line = cart.add(product_id, quantity, product.price, size);
        self.store.save_cart(&cart).await?;

        debug!(line_id = %line, total = %cart.total(), "Added to cart");
        self.view(&cart).await
    }

    /// Overwrite the quantity of the line for a product.
    ///
    /// With a size, only the line for that size is updated; without one, the
    /// first line for the product is.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::InvalidInput` for a quantity below 1,
    /// `CommerceError::NotFound` if the cart, product or line is missing and
    /// `CommerceError::InsufficientStock` if stock is below `quantity`.
    #[instrument(skip(self, size), fields(shopper_id = %shopper, product_id = %product_id))]
    pub async fn update_quantity(
        &self,
        shopper: UserId,
        product_id: ProductId,
        quantity: i64,
        size: Option<&SizeSelector>,
    ) -> Result<CartView, CommerceError> {
        let quantity = checked_quantity(quantity)?;

        let mut cart = self
            .store
            .find_cart(shopper)
            .await?
            .ok_or_else(|| CommerceError::not_found("Cart not found"))?;

        let product = self
            .store
            .find_product(product_id)
            .await?
            .ok_or_else(|| CommerceError::not_found("Product not found"))?;

        let size = resolve_size(&product, size)?;

        let line = cart
            .find_line(product_id, size)
            .map(|item| item.id)
            .ok_or_else(|| CommerceError::not_found("Item not found in cart"))?;

        if !product.has_stock(quantity) {
            return Err(CommerceError::InsufficientStock {
                product: product.name,
            });
        }

        cart.set_quantity(line, quantity);
        self.store.save_cart(&cart).await?;
        self.view(&cart).await
    }

    /// Remove every line matching a product id or a line id.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::NotFound` if the shopper has no cart.
    #[instrument(skip(self), fields(shopper_id = %shopper))]
    pub async fn remove_item(
        &self,
        shopper: UserId,
        target: LineTarget,
    ) -> Result<(CartView, Removal), CommerceError> {
        let mut cart = self
            .store
            .find_cart(shopper)
            .await?
            .ok_or_else(|| CommerceError::not_found("Cart not found"))?;

        let removed = cart.remove(target);
        let outcome = if removed == 0 {
            Removal::NothingMatched
        } else {
            self.store.save_cart(&cart).await?;
            Removal::Removed(removed)
        };

        Ok((self.view(&cart).await?, outcome))
    }

    /// Empty the shopper's cart. The cart itself is kept.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::NotFound` if the shopper has no cart.
    #[instrument(skip(self), fields(shopper_id = %shopper))]
    pub async fn clear(&self, shopper: UserId) -> Result<CartView, CommerceError> {
        let mut cart = self
            .store
            .find_cart(shopper)
            .await?
            .ok_or_else(|| CommerceError::not_found("Cart not found"))?;

        cart.clear();
        self.store.save_cart(&cart).await?;
        self.view(&cart).await
    }
}

/// Resolve a requested size against the product's variants.
///
/// A blank name means no size.
fn resolve_size(
    product: &Product,
    selector: Option<&SizeSelector>,
) -> Result<Option<SizeId>, CommerceError> {
    match selector {
        None => Ok(None),
        Some(selector) if selector.is_blank() => Ok(None),
        Some(selector) => product
            .find_size(selector)
            .map(|size| Some(size.id))
            .ok_or_else(|| {
                CommerceError::invalid(format!("Size not available for {}", product.name))
            }),
    }
}
