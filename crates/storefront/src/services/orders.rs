//! Order placement and order views.
//!
//! Placing an order validates everything up front, then commits in three
//! steps: insert the order, take stock line by line, clear the cart. Stock is
//! taken with a conditional decrement. If any decrement fails, stock already
//! taken is put back and the order is marked `failed`.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use ironmonger_core::{
    AddressId, OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, UserId, sum_lines,
    validate_price,
};

use super::{CommerceError, checked_quantity};
use crate::db::{
    AddressStore, CartStore, CatalogStore, IdentityStore, OrderStore, RepositoryError,
};
use crate::models::{
    Identity, NewOrder, Order, OrderItem, OrderView, Product, ShippingAddress, Shopper,
};

/// One caller-supplied order line.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub quantity: Option<i64>,
    /// Overrides the catalog price when present.
    #[serde(default)]
    pub price: Option<Decimal>,
}

/// Order placement request.
///
/// Without `items` (or with an empty list) the shopper's cart is ordered.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaceOrder {
    pub items: Option<Vec<RequestedItem>>,
    /// Replaces the computed total. Only honored with explicit items.
    pub total: Option<Decimal>,
    pub shipping_address: Option<ShippingAddress>,
    /// Saved address to snapshot instead of an inline one.
    pub shipping_address_id: Option<AddressId>,
    pub payment_method: Option<String>,
    pub payment_evidence: Option<String>,
}

/// Lines and total ready to commit.
struct Draft {
    items: Vec<OrderItem>,
    total: Decimal,
    names: BTreeMap<ProductId, String>,
}

/// Order service for one store.
pub struct OrderService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> OrderService<'a, S>
where
    S: CatalogStore + CartStore + OrderStore + AddressStore + IdentityStore + ?Sized,
{
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Turn the cart (or an explicit item list) into an order.
    ///
    /// # Errors
    ///
    /// Validation failures happen before anything is written:
    /// `CommerceError::InvalidInput` (bad quantity, negative price, QR without
    /// evidence), `CommerceError::NotFound` (missing product or address),
    /// `CommerceError::InsufficientStock` and `CommerceError::InvalidState`
    /// (empty cart).
    ///
    /// After the order is inserted, a lost stock race returns
    /// `CommerceError::InsufficientStock` and any other failure returns
    /// `CommerceError::CommitFailed`.
    #[instrument(skip(self, request), fields(shopper_id = %shopper))]
    pub async fn place_order(
        &self,
        shopper: UserId,
        request: PlaceOrder,
    ) -> Result<OrderView, CommerceError> {
        let payment_method = PaymentMethod::normalize(request.payment_method.as_deref());
        let payment_evidence = request
            .payment_evidence
            .map(|e| e.trim().to_owned())
            .filter(|e| !e.is_empty());
        if payment_method.requires_evidence() && payment_evidence.is_none() {
            return Err(CommerceError::invalid(
                "Payment evidence is required for QR payments",
            ));
        }

        let shipping_address = match request.shipping_address_id {
            Some(id) => self
                .store
                .find_address(shopper, id)
                .await?
                .map(|address| ShippingAddress::from(&address))
                .ok_or_else(|| CommerceError::not_found("Address not found"))?,
            None => request.shipping_address.unwrap_or_default(),
        };

        let draft = match request.items.filter(|items| !items.is_empty()) {
            Some(items) => self.draft_from_items(&items, request.total).await?,
            None => self.draft_from_cart(shopper).await?,
        };

        let order = self
            .store
            .insert_order(NewOrder {
                user_id: shopper,
                items: draft.items,
                total: draft.total,
                shipping_address,
                payment_method,
                payment_evidence,
            })
            .await?;

        self.take_stock(&order, &draft.names).await?;
        self.clear_cart(shopper, order.id).await?;

        info!(order_id = %order.id, total = %order.total, "Order placed");
        self.view(order, None).await
    }

    async fn draft_from_items(
        &self,
        requested: &[RequestedItem],
        total_override: Option<Decimal>,
    ) -> Result<Draft, CommerceError> {
        let mut items = Vec::with_capacity(requested.len());
        let mut products = BTreeMap::new();

        for line in requested {
            let quantity = checked_quantity(line.quantity.unwrap_or(1))?;
            let product = self.fetch_product(line.product_id).await?;
            let price = match line.price {
                Some(price) => validate_price("price", price)?,
                None => product.price,
            };
            items.push(OrderItem {
                product_id: product.id,
                quantity,
                price,
            });
            products.insert(product.id, product);
        }

        check_stock(&items, &products)?;

        let computed = sum_lines(items.iter().map(|item| (item.price, item.quantity)));
        let total = match total_override {
            Some(total) => {
                let total = validate_price("total", total)?;
                if total != computed {
                    warn!(%total, %computed, "Order total overridden by caller");
                }
                total
            }
            None => computed,
        };

        Ok(Draft {
            items,
            total,
            names: names_of(products),
        })
    }

    async fn draft_from_cart(&self, shopper: UserId) -> Result<Draft, CommerceError> {
        let cart = self
            .store
            .find_cart(shopper)
            .await?
            .filter(|cart| !cart.is_empty())
            .ok_or_else(|| CommerceError::InvalidState("Cart is empty".to_owned()))?;

        let mut products = BTreeMap::new();
        for line in cart.items() {
            if !products.contains_key(&line.product_id) {
                let product = self.fetch_product(line.product_id).await?;
                products.insert(product.id, product);
            }
        }

        let items: Vec<OrderItem> = cart
            .items()
            .iter()
            .map(|line| OrderItem {
                product_id: line.product_id,
                quantity: line.quantity,
                price: line.price,
            })
            .collect();

        check_stock(&items, &products)?;

        Ok(Draft {
            items,
            total: cart.total(),
            names: names_of(products),
        })
    }

    async fn fetch_product(&self, id: ProductId) -> Result<Product, CommerceError> {
        self.store
            .find_product(id)
            .await?
            .ok_or_else(|| CommerceError::not_found(format!("Product {id} not found")))
    }

    /// Decrement stock for every line, compensating on the first failure.
    async fn take_stock(
        &self,
        order: &Order,
        names: &BTreeMap<ProductId, String>,
    ) -> Result<(), CommerceError> {
        let mut taken: Vec<&OrderItem> = Vec::with_capacity(order.items.len());

        for item in &order.items {
            let failure = match self
                .store
                .try_decrement_stock(item.product_id, item.quantity)
                .await
            {
                Ok(true) => {
                    taken.push(item);
                    continue;
                }
                Ok(false) => CommerceError::InsufficientStock {
                    product: names
                        .get(&item.product_id)
                        .cloned()
                        .unwrap_or_else(|| item.product_id.to_string()),
                },
                Err(err) => CommerceError::CommitFailed(err.to_string()),
            };

            warn!(order_id = %order.id, product_id = %item.product_id, error = %failure, "Stock commit failed, compensating");
            self.compensate(order.id, &taken).await;
            return Err(failure);
        }

        Ok(())
    }

    /// Put back stock already taken and mark the order failed. Errors here
    /// are logged; the original failure is what the caller sees.
    async fn compensate(&self, order_id: OrderId, taken: &[&OrderItem]) {
        for item in taken {
            if let Err(err) = self.store.restock(item.product_id, item.quantity).await {
                error!(%order_id, product_id = %item.product_id, quantity = item.quantity, error = %err, "Failed to restock after aborted order");
            }
        }

        if let Err(err) = self
            .store
            .update_order_status(order_id, Some(OrderStatus::Failed), Some(PaymentStatus::Failed))
            .await
        {
            error!(%order_id, error = %err, "Failed to mark aborted order as failed");
        }
    }

    async fn clear_cart(&self, shopper: UserId, order_id: OrderId) -> Result<(), CommerceError> {
        let cleared = async {
            if let Some(mut cart) = self.store.find_cart(shopper).await?
                && !cart.is_empty()
            {
                cart.clear();
                self.store.save_cart(&cart).await?;
            }
            Ok::<_, RepositoryError>(())
        }
        .await;

        cleared.map_err(|err| {
            error!(%order_id, error = %err, "Order placed but cart was not cleared");
            CommerceError::CommitFailed(format!(
                "order {order_id} was placed but the cart could not be cleared"
            ))
        })
    }

    /// The shopper's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Repository` on storage failure.
    #[instrument(skip(self), fields(shopper_id = %shopper))]
    pub async fn list_for_shopper(&self, shopper: UserId) -> Result<Vec<OrderView>, CommerceError> {
        let orders = self.store.list_orders_for(shopper).await?;
        self.views(orders, false).await
    }

    /// One of the shopper's orders.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::NotFound` if the order is absent or belongs to
    /// another shopper.
    #[instrument(skip(self), fields(shopper_id = %shopper, order_id = %id))]
    pub async fn get_one(&self, shopper: UserId, id: OrderId) -> Result<OrderView, CommerceError> {
        let order = self
            .store
            .find_order(id)
            .await?
            .filter(|order| order.user_id == shopper)
            .ok_or_else(|| CommerceError::not_found("Order not found"))?;
        self.view(order, None).await
    }

    /// Overwrite whichever status fields are given.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Forbidden` for non-admin callers,
    /// `CommerceError::InvalidInput` for unknown status values and
    /// `CommerceError::NotFound` if the order is absent.
    #[instrument(skip(self), fields(actor_id = %actor.shopper, order_id = %id))]
    pub async fn update_status(
        &self,
        actor: &Identity,
        id: OrderId,
        status: Option<&str>,
        payment_status: Option<&str>,
    ) -> Result<OrderView, CommerceError> {
        require_admin(actor)?;

        let status = status
            .map(str::parse::<OrderStatus>)
            .transpose()
            .map_err(CommerceError::InvalidInput)?;
        let payment_status = payment_status
            .map(str::parse::<PaymentStatus>)
            .transpose()
            .map_err(CommerceError::InvalidInput)?;

        let order = self
            .store
            .update_order_status(id, status, payment_status)
            .await?
            .ok_or_else(|| CommerceError::not_found("Order not found"))?;

        info!(status = %order.status, payment_status = %order.payment_status, "Order status updated");
        self.view(order, None).await
    }

    /// Every order, newest first, with shopper summaries.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::Forbidden` for non-admin callers.
    #[instrument(skip(self), fields(actor_id = %actor.shopper))]
    pub async fn list_all(&self, actor: &Identity) -> Result<Vec<OrderView>, CommerceError> {
        require_admin(actor)?;
        let orders = self.store.list_all_orders().await?;
        self.views(orders, true).await
    }

    async fn view(
        &self,
        order: Order,
        shopper: Option<Shopper>,
    ) -> Result<OrderView, CommerceError> {
        let ids: Vec<ProductId> = order.items.iter().map(|item| item.product_id).collect();
        let products = self.store.find_products(&ids).await?;
        Ok(OrderView::build(order, &products, shopper))
    }

    async fn views(
        &self,
        orders: Vec<Order>,
        with_shoppers: bool,
    ) -> Result<Vec<OrderView>, CommerceError> {
        let mut product_ids: Vec<ProductId> = orders
            .iter()
            .flat_map(|order| order.items.iter().map(|item| item.product_id))
            .collect();
        product_ids.sort_unstable();
        product_ids.dedup();
        let products = self.store.find_products(&product_ids).await?;

        let shoppers = if with_shoppers {
            let mut user_ids: Vec<UserId> = orders.iter().map(|order| order.user_id).collect();
            user_ids.sort_unstable();
            user_ids.dedup();
            self.store.find_shoppers(&user_ids).await?
        } else {
            Vec::new()
        };

        Ok(orders
            .into_iter()
            .map(|order| {
                let shopper = shoppers.iter().find(|s| s.id == order.user_id).cloned();
                OrderView::build(order, &products, shopper)
            })
            .collect())
    }
}

fn require_admin(actor: &Identity) -> Result<(), CommerceError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(CommerceError::Forbidden("Access denied. Admin only.".to_owned()))
    }
}

/// Check stock against the summed demand per product, so repeated lines
/// for one product cannot pass individually and oversell together.
fn check_stock(
    items: &[OrderItem],
    products: &BTreeMap<ProductId, Product>,
) -> Result<(), CommerceError> {
    let mut demand: BTreeMap<ProductId, u32> = BTreeMap::new();
    for item in items {
        let entry = demand.entry(item.product_id).or_default();
        *entry = entry.saturating_add(item.quantity);
    }

    for (id, quantity) in demand {
        if let Some(product) = products.get(&id)
            && !product.has_stock(quantity)
        {
            return Err(CommerceError::InsufficientStock {
                product: product.name.clone(),
            });
        }
    }
    Ok(())
}

fn names_of(products: BTreeMap<ProductId, Product>) -> BTreeMap<ProductId, String> {
    products
        .into_iter()
        .map(|(id, product)| (id, product.name))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ironmonger_core::Role;

    use super::*;
    use crate::db::MemoryStore;
    use crate::db::memory::Fault;
    use crate::models::AddressInput;
    use crate::services::test_support::{dec, product, shopper};
    use crate::services::{AddressService, CartService};

    fn cod() -> PlaceOrder {
        PlaceOrder {
            payment_method: Some("cod".to_owned()),
            ..PlaceOrder::default()
        }
    }

    fn explicit(items: Vec<RequestedItem>) -> PlaceOrder {
        PlaceOrder {
            items: Some(items),
            ..cod()
        }
    }

    fn line(product_id: ProductId, quantity: i64) -> RequestedItem {
        RequestedItem {
            product_id,
            quantity: Some(quantity),
            price: None,
        }
    }

    /// Cart [(P1, 2 @ 10), (P2, 1 @ 5)] with stock 10 each.
    async fn scenario() -> (MemoryStore, UserId, ProductId, ProductId) {
        let store = MemoryStore::new();
        let user = shopper(&store).await;
        let p1 = store.insert_product(product("Hammer", 10, 10)).await;
        let p2 = store.insert_product(product("Nails", 5, 10)).await;
        let cart = CartService::new(&store);
        cart.add_item(user, p1, Some(2), None).await.unwrap();
        cart.add_item(user, p2, Some(1), None).await.unwrap();
        (store, user, p1, p2)
    }

    #[tokio::test]
    async fn test_cart_order_scenario() {
        let (store, user, p1, p2) = scenario().await;

        let order = OrderService::new(&store).place_order(user, cod()).await.unwrap();

        assert_eq!(order.total, dec(25));
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert!(order.items.iter().all(|item| item.product.is_some()));
        assert_eq!(store.product_stock(p1).await, Some(8));
        assert_eq!(store.product_stock(p2).await, Some(9));

        let cart = store.find_cart(user).await.unwrap().unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_cart_mode_ignores_total_override() {
        let (store, user, _, _) = scenario().await;
        let request = PlaceOrder {
            total: Some(dec(1)),
            ..cod()
        };

        let order = OrderService::new(&store).place_order(user, request).await.unwrap();
        assert_eq!(order.total, dec(25));
    }

    #[tokio::test]
    async fn test_empty_cart_is_invalid_state() {
        let store = MemoryStore::new();
        let user = shopper(&store).await;
        let service = OrderService::new(&store);

        let err = service.place_order(user, cod()).await.unwrap_err();
        assert!(matches!(err, CommerceError::InvalidState(_)));

        CartService::new(&store).get(user).await.unwrap();
        let err = service.place_order(user, cod()).await.unwrap_err();
        assert!(matches!(err, CommerceError::InvalidState(_)));
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_qr_requires_evidence() {
        let (store, user, p1, _) = scenario().await;
        let service = OrderService::new(&store);

        for evidence in [None, Some("   ".to_owned())] {
            let request = PlaceOrder {
                payment_method: Some("QR".to_owned()),
                payment_evidence: evidence,
                ..PlaceOrder::default()
            };
            let err = service.place_order(user, request).await.unwrap_err();
            assert!(matches!(err, CommerceError::InvalidInput(_)));
        }

        assert_eq!(store.order_count().await, 0);
        assert_eq!(store.product_stock(p1).await, Some(10));

        let request = PlaceOrder {
            payment_method: Some("qr".to_owned()),
            payment_evidence: Some("uploads/receipt-1.jpg".to_owned()),
            ..PlaceOrder::default()
        };
        let order = service.place_order(user, request).await.unwrap();
        assert_eq!(order.payment_method, PaymentMethod::Qr);
        assert_eq!(order.payment_evidence.as_deref(), Some("uploads/receipt-1.jpg"));
    }

    #[tokio::test]
    async fn test_unknown_method_defaults_to_cod() {
        let (store, user, _, _) = scenario().await;
        let request = PlaceOrder {
            payment_method: Some("card".to_owned()),
            ..PlaceOrder::default()
        };
        let order = OrderService::new(&store).place_order(user, request).await.unwrap();
        assert_eq!(order.payment_method, PaymentMethod::Cod);
    }

    #[tokio::test]
    async fn test_cart_mode_rechecks_stock() {
        let (store, user, p1, _) = scenario().await;
        // Stock drops after the item was carted.
        assert!(store.try_decrement_stock(p1, 9).await.unwrap());

        let err = OrderService::new(&store).place_order(user, cod()).await.unwrap_err();
        assert!(matches!(err, CommerceError::InsufficientStock { .. }));
        assert_eq!(store.order_count().await, 0);
        assert_eq!(store.product_stock(p1).await, Some(1));
    }

    #[tokio::test]
    async fn test_cart_mode_missing_product() {
        let (store, user, p1, _) = scenario().await;
        store.remove_product(p1).await;

        let err = OrderService::new(&store).place_order(user, cod()).await.unwrap_err();
        assert!(matches!(err, CommerceError::NotFound(_)));
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_explicit_items() {
        let (store, user, p1, p2) = scenario().await;
        let request = explicit(vec![
            line(p1, 3),
            RequestedItem {
                product_id: p2,
                quantity: None,
                price: Some(dec(4)),
            },
        ]);

        let order = OrderService::new(&store).place_order(user, request).await.unwrap();

        assert_eq!(order.total, dec(34));
        assert_eq!(order.items[1].quantity, 1);
        assert_eq!(order.items[1].price, dec(4));
        assert_eq!(store.product_stock(p1).await, Some(7));
        assert_eq!(store.product_stock(p2).await, Some(9));
        // The cart is cleared in both modes.
        assert!(store.find_cart(user).await.unwrap().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_explicit_total_override_kept() {
        let (store, user, p1, _) = scenario().await;
        let request = PlaceOrder {
            total: Some(dec(7)),
            ..explicit(vec![line(p1, 1)])
        };

        let order = OrderService::new(&store).place_order(user, request).await.unwrap();
        assert_eq!(order.total, dec(7));
    }

    #[tokio::test]
    async fn test_explicit_negative_amounts_rejected() {
        let (store, user, p1, _) = scenario().await;
        let service = OrderService::new(&store);

        let request = PlaceOrder {
            total: Some(dec(-1)),
            ..explicit(vec![line(p1, 1)])
        };
        assert!(matches!(
            service.place_order(user, request).await.unwrap_err(),
            CommerceError::InvalidInput(_)
        ));

        let request = explicit(vec![RequestedItem {
            product_id: p1,
            quantity: Some(1),
            price: Some(dec(-5)),
        }]);
        assert!(matches!(
            service.place_order(user, request).await.unwrap_err(),
            CommerceError::InvalidInput(_)
        ));
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_explicit_amounts_limited_to_cents() {
        let (store, user, p1, _) = scenario().await;
        let service = OrderService::new(&store);

        let request = explicit(vec![RequestedItem {
            product_id: p1,
            quantity: Some(1),
            price: Some(Decimal::new(3333, 3)),
        }]);
        let err = service.place_order(user, request).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "price must have at most 2 decimal places (got 3.333)"
        );

        let request = PlaceOrder {
            total: Some(Decimal::new(10_005, 3)),
            ..explicit(vec![line(p1, 1)])
        };
        assert!(matches!(
            service.place_order(user, request).await.unwrap_err(),
            CommerceError::InvalidInput(_)
        ));
        assert_eq!(store.order_count().await, 0);
        assert_eq!(store.product_stock(p1).await, Some(10));

        let request = PlaceOrder {
            total: Some(Decimal::new(12_500, 3)),
            ..explicit(vec![RequestedItem {
                product_id: p1,
                quantity: Some(1),
                price: Some(Decimal::new(1_250, 2)),
            }])
        };
        let order = service.place_order(user, request).await.unwrap();
        assert_eq!(order.total.to_string(), "12.5");
        assert_eq!(order.items.first().unwrap().price.to_string(), "12.5");
    }

    #[tokio::test]
    async fn test_explicit_validation_happens_before_commit() {
        let (store, user, p1, _) = scenario().await;
        let service = OrderService::new(&store);

        let missing = explicit(vec![line(p1, 1), line(ProductId::new(404), 1)]);
        assert!(matches!(
            service.place_order(user, missing).await.unwrap_err(),
            CommerceError::NotFound(_)
        ));

        let too_many = explicit(vec![line(p1, 11)]);
        assert!(matches!(
            service.place_order(user, too_many).await.unwrap_err(),
            CommerceError::InsufficientStock { .. }
        ));

        // Two lines that fit alone but not together.
        let split = explicit(vec![line(p1, 6), line(p1, 6)]);
        assert!(matches!(
            service.place_order(user, split).await.unwrap_err(),
            CommerceError::InsufficientStock { .. }
        ));

        assert_eq!(store.order_count().await, 0);
        assert_eq!(store.product_stock(p1).await, Some(10));
    }

    #[tokio::test]
    async fn test_decrement_failure_compensates() {
        let (store, user, p1, p2) = scenario().await;
        store.inject(Fault::DecrementStock(p2)).await;

        let err = OrderService::new(&store).place_order(user, cod()).await.unwrap_err();
        assert!(matches!(err, CommerceError::CommitFailed(_)));

        // P1 was taken then put back; the order exists but is failed.
        assert_eq!(store.product_stock(p1).await, Some(10));
        assert_eq!(store.product_stock(p2).await, Some(10));
        let orders = store.list_orders_for(user).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, OrderStatus::Failed);
        assert_eq!(orders[0].payment_status, PaymentStatus::Failed);
        // The cart is left for a retry.
        assert_eq!(store.find_cart(user).await.unwrap().unwrap().items().len(), 2);
    }

    #[tokio::test]
    async fn test_cart_clear_failure_keeps_order() {
        let (store, user, p1, _) = scenario().await;
        store.inject(Fault::SaveCart).await;

        let err = OrderService::new(&store).place_order(user, cod()).await.unwrap_err();
        assert!(matches!(err, CommerceError::CommitFailed(_)));

        let orders = store.list_orders_for(user).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, OrderStatus::Pending);
        assert_eq!(store.product_stock(p1).await, Some(8));
    }

    #[tokio::test]
    async fn test_insert_failure_changes_nothing() {
        let (store, user, p1, _) = scenario().await;
        store.inject(Fault::InsertOrder).await;

        let err = OrderService::new(&store).place_order(user, cod()).await.unwrap_err();
        assert!(matches!(err, CommerceError::Repository(_)));
        assert_eq!(store.product_stock(p1).await, Some(10));
        assert_eq!(store.find_cart(user).await.unwrap().unwrap().items().len(), 2);
    }

    #[tokio::test]
    async fn test_shipping_address_snapshot() {
        let (store, user, _, _) = scenario().await;
        let saved = AddressService::new(&store)
            .add(
                user,
                AddressInput {
                    name: Some("Asha".to_owned()),
                    phone: Some("98765".to_owned()),
                    address_line1: Some("4 Smithy Row".to_owned()),
                    city: Some("Nagpur".to_owned()),
                    state: Some("MH".to_owned()),
                    postal_code: Some("440001".to_owned()),
                    ..AddressInput::default()
                },
            )
            .await
            .unwrap();

        let service = OrderService::new(&store);
        let request = PlaceOrder {
            shipping_address_id: Some(AddressId::new(9999)),
            ..cod()
        };
        assert!(matches!(
            service.place_order(user, request).await.unwrap_err(),
            CommerceError::NotFound(_)
        ));

        let request = PlaceOrder {
            shipping_address_id: Some(saved.id),
            ..cod()
        };
        let order = service.place_order(user, request).await.unwrap();
        assert_eq!(order.shipping_address.city, "Nagpur");
        assert_eq!(order.shipping_address.postal_code, "440001");
    }

    #[tokio::test]
    async fn test_get_one_is_scoped() {
        let (store, user, _, _) = scenario().await;
        let other = store
            .insert_shopper("Other", "other@example.com", Role::Customer)
            .await;
        let service = OrderService::new(&store);
        let order = service.place_order(user, cod()).await.unwrap();

        assert_eq!(service.get_one(user, order.id).await.unwrap().id, order.id);
        assert!(matches!(
            service.get_one(other, order.id).await.unwrap_err(),
            CommerceError::NotFound(_)
        ));
        assert!(service.list_for_shopper(other).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let (store, user, p1, _) = scenario().await;
        let service = OrderService::new(&store);
        let first = service.place_order(user, cod()).await.unwrap();
        let second = service
            .place_order(user, explicit(vec![line(p1, 1)]))
            .await
            .unwrap();

        let orders = service.list_for_shopper(user).await.unwrap();
        assert_eq!(
            orders.iter().map(|o| o.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );
    }

    #[tokio::test]
    async fn test_update_status() {
        let (store, user, _, _) = scenario().await;
        let admin_id = store
            .insert_shopper("Admin", "admin@example.com", Role::Admin)
            .await;
        let admin = Identity::new(admin_id, Role::Admin);
        let customer = Identity::new(user, Role::Customer);
        let service = OrderService::new(&store);
        let order = service.place_order(user, cod()).await.unwrap();

        assert!(matches!(
            service
                .update_status(&customer, order.id, Some("shipped"), None)
                .await
                .unwrap_err(),
            CommerceError::Forbidden(_)
        ));
        assert!(matches!(
            service
                .update_status(&admin, order.id, Some("teleported"), None)
                .await
                .unwrap_err(),
            CommerceError::InvalidInput(_)
        ));
        assert!(matches!(
            service
                .update_status(&admin, OrderId::new(9999), Some("shipped"), None)
                .await
                .unwrap_err(),
            CommerceError::NotFound(_)
        ));

        let updated = service
            .update_status(&admin, order.id, Some("shipped"), None)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Shipped);
        assert_eq!(updated.payment_status, PaymentStatus::Pending);

        let updated = service
            .update_status(&admin, order.id, None, Some("paid"))
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Shipped);
        assert_eq!(updated.payment_status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_list_all_resolves_shoppers() {
        let (store, user, _, _) = scenario().await;
        let admin_id = store
            .insert_shopper("Admin", "admin@example.com", Role::Admin)
            .await;
        let service = OrderService::new(&store);
        service.place_order(user, cod()).await.unwrap();

        let customer = Identity::new(user, Role::Customer);
        assert!(matches!(
            service.list_all(&customer).await.unwrap_err(),
            CommerceError::Forbidden(_)
        ));

        let all = service
            .list_all(&Identity::new(admin_id, Role::Admin))
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(
            all[0].shopper.as_ref().map(|s| s.email.as_str()),
            Some("shopper@example.com")
        );
    }
}
