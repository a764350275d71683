//! `MemoryStore` - HashMap-backed store for tests.
//!
//! Behaves like [`super::PgStore`]: conditional stock decrement, one default
//! address per shopper, newest-first order listings. Faults can be injected
//! to exercise the order commit's failure paths.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use ironmonger_core::{
    AddressId, OrderId, OrderStatus, PaymentStatus, ProductId, Role, UserId,
};

use super::{
    AddressStore, CartStore, CatalogStore, IdentityStore, OrderStore, RepositoryError, Store,
    WishlistStore,
};
use crate::models::{
    Address, AddressFields, Cart, Identity, NewOrder, Order, Product, Shopper,
};

/// A failure to inject into the next matching store call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// `try_decrement_stock` for this product errors.
    DecrementStock(ProductId),
    /// `save_cart` errors.
    SaveCart,
    /// `insert_order` errors.
    InsertOrder,
}

#[derive(Debug, Default)]
struct State {
    shoppers: BTreeMap<UserId, (Shopper, Role)>,
    tokens: HashMap<String, UserId>,
    products: BTreeMap<ProductId, Product>,
    carts: HashMap<UserId, Cart>,
    orders: BTreeMap<OrderId, Order>,
    addresses: BTreeMap<AddressId, Address>,
    wishlists: HashMap<UserId, Vec<ProductId>>,
    faults: Vec<Fault>,
    next_id: i32,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn take_fault(&mut self, fault: Fault) -> Result<(), RepositoryError> {
        if let Some(pos) = self.faults.iter().position(|f| *f == fault) {
            self.faults.remove(pos);
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn demote_all(&mut self, user: UserId) {
        for address in self.addresses.values_mut().filter(|a| a.user_id == user) {
            address.is_default = false;
        }
    }
}

/// In-memory store. Clone-friendly via `Arc`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shopper and return its id.
    pub async fn insert_shopper(&self, name: &str, email: &str, role: Role) -> UserId {
        let mut state = self.state.write().await;
        let id = UserId::new(state.next_id());
        let shopper = Shopper {
            id,
            name: name.to_owned(),
            email: email.to_owned(),
            phone: None,
        };
        state.shoppers.insert(id, (shopper, role));
        id
    }

    /// Register a token hash for a shopper.
    pub async fn insert_token(&self, token_hash: &str, shopper: UserId) {
        self.state
            .write()
            .await
            .tokens
            .insert(token_hash.to_owned(), shopper);
    }

    /// Add or replace a product. A zero id is replaced by a fresh one.
    pub async fn insert_product(&self, mut product: Product) -> ProductId {
        let mut state = self.state.write().await;
        if product.id.as_i32() == 0 {
            product.id = ProductId::new(state.next_id());
        }
        let id = product.id;
        state.products.insert(id, product);
        id
    }

    /// Remove a product from the catalog.
    pub async fn remove_product(&self, id: ProductId) {
        self.state.write().await.products.remove(&id);
    }

    /// Current stock of a product.
    pub async fn product_stock(&self, id: ProductId) -> Option<u32> {
        self.state.read().await.products.get(&id).map(|p| p.stock)
    }

    /// Number of stored orders across all shoppers.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Make the next matching call fail with a database error.
    pub async fn inject(&self, fault: Fault) {
        self.state.write().await.faults.push(fault);
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn find_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .products
            .values()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn try_decrement_stock(
        &self,
        id: ProductId,
        quantity: u32,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        state.take_fault(Fault::DecrementStock(id))?;
        match state.products.get_mut(&id) {
            Some(product) if product.stock >= quantity => {
                product.stock -= quantity;
                product.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn restock(&self, id: ProductId, quantity: u32) -> Result<(), RepositoryError> {
        if let Some(product) = self.state.write().await.products.get_mut(&id) {
            product.stock = product.stock.saturating_add(quantity);
            product.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn find_cart(&self, user: UserId) -> Result<Option<Cart>, RepositoryError> {
        Ok(self.state.read().await.carts.get(&user).cloned())
    }

    async fn save_cart(&self, cart: &Cart) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state.take_fault(Fault::SaveCart)?;
        state.carts.insert(cart.user_id(), cart.clone());
        Ok(())
    }
}

fn newest_first(a: &Order, b: &Order) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let mut state = self.state.write().await;
        state.take_fault(Fault::InsertOrder)?;
        let id = OrderId::new(state.next_id());
        let order = Order {
            id,
            user_id: order.user_id,
            items: order.items,
            total: order.total,
            shipping_address: order.shipping_address,
            payment_method: order.payment_method,
            payment_evidence: order.payment_evidence,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            created_at: Utc::now(),
        };
        state.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn find_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.state.read().await.orders.get(&id).cloned())
    }

    async fn list_orders_for(&self, user: UserId) -> Result<Vec<Order>, RepositoryError> {
        let state = self.state.read().await;
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|o| o.user_id == user)
            .cloned()
            .collect();
        orders.sort_by(newest_first);
        Ok(orders)
    }

    async fn list_all_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        let mut orders: Vec<Order> = self.state.read().await.orders.values().cloned().collect();
        orders.sort_by(newest_first);
        Ok(orders)
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: Option<OrderStatus>,
        payment_status: Option<PaymentStatus>,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut state = self.state.write().await;
        let Some(order) = state.orders.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(status) = status {
            order.status = status;
        }
        if let Some(payment_status) = payment_status {
            order.payment_status = payment_status;
        }
        Ok(Some(order.clone()))
    }
}

#[async_trait]
impl AddressStore for MemoryStore {
    async fn list_addresses(&self, user: UserId) -> Result<Vec<Address>, RepositoryError> {
        let state = self.state.read().await;
        let mut addresses: Vec<Address> = state
            .addresses
            .values()
            .filter(|a| a.user_id == user)
            .cloned()
            .collect();
        addresses.sort_by(|a, b| {
            b.is_default
                .cmp(&a.is_default)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });
        Ok(addresses)
    }

    async fn find_address(
        &self,
        user: UserId,
        id: AddressId,
    ) -> Result<Option<Address>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .addresses
            .get(&id)
            .filter(|a| a.user_id == user)
            .cloned())
    }

    async fn count_addresses(&self, user: UserId) -> Result<u64, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.addresses.values().filter(|a| a.user_id == user).count() as u64)
    }

    async fn insert_address(
        &self,
        user: UserId,
        fields: &AddressFields,
        make_default: bool,
    ) -> Result<Address, RepositoryError> {
        let mut state = self.state.write().await;
        if make_default {
            state.demote_all(user);
        }
        let id = AddressId::new(state.next_id());
        let address = Address {
            id,
            user_id: user,
            name: fields.name.clone(),
            phone: fields.phone.clone(),
            address_line1: fields.address_line1.clone(),
            address_line2: fields.address_line2.clone(),
            city: fields.city.clone(),
            state: fields.state.clone(),
            postal_code: fields.postal_code.clone(),
            is_default: make_default,
            created_at: Utc::now(),
        };
        state.addresses.insert(id, address.clone());
        Ok(address)
    }

    async fn save_address(&self, address: &Address) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        let owned = state
            .addresses
            .get(&address.id)
            .is_some_and(|a| a.user_id == address.user_id);
        if !owned {
            return Err(RepositoryError::NotFound);
        }
        if address.is_default {
            state.demote_all(address.user_id);
        }
        state.addresses.insert(address.id, address.clone());
        Ok(())
    }

    async fn delete_address(
        &self,
        user: UserId,
        id: AddressId,
    ) -> Result<Option<Address>, RepositoryError> {
        let mut state = self.state.write().await;
        if state.addresses.get(&id).is_some_and(|a| a.user_id == user) {
            return Ok(state.addresses.remove(&id));
        }
        Ok(None)
    }

    async fn set_default_address(
        &self,
        user: UserId,
        id: AddressId,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        if !state.addresses.get(&id).is_some_and(|a| a.user_id == user) {
            return Ok(false);
        }
        state.demote_all(user);
        if let Some(address) = state.addresses.get_mut(&id) {
            address.is_default = true;
        }
        Ok(true)
    }
}

#[async_trait]
impl WishlistStore for MemoryStore {
    async fn wishlist_products(&self, user: UserId) -> Result<Vec<ProductId>, RepositoryError> {
        Ok(self
            .state
            .read()
            .await
            .wishlists
            .get(&user)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_wishlist_product(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        let list = state.wishlists.entry(user).or_default();
        if list.contains(&product) {
            return Ok(false);
        }
        list.push(product);
        Ok(true)
    }

    async fn remove_wishlist_product(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        let Some(list) = state.wishlists.get_mut(&user) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|p| *p != product);
        Ok(list.len() < before)
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn resolve_token(&self, token_hash: &str) -> Result<Option<Identity>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.tokens.get(token_hash).and_then(|user| {
            state
                .shoppers
                .get(user)
                .map(|(_, role)| Identity::new(*user, *role))
        }))
    }

    async fn find_shoppers(&self, ids: &[UserId]) -> Result<Vec<Shopper>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .shoppers
            .values()
            .filter(|(shopper, _)| ids.contains(&shopper.id))
            .map(|(shopper, _)| shopper.clone())
            .collect())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn product(stock: u32) -> Product {
        Product {
            id: ProductId::new(0),
            name: "Anvil".to_owned(),
            description: None,
            price: Decimal::new(100, 0),
            stock,
            sizes: Vec::new(),
            status: ironmonger_core::ProductStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_decrement_is_conditional() {
        let store = MemoryStore::new();
        let id = store.insert_product(product(2)).await;

        assert!(!store.try_decrement_stock(id, 3).await.unwrap());
        assert_eq!(store.product_stock(id).await, Some(2));
        assert!(store.try_decrement_stock(id, 2).await.unwrap());
        assert_eq!(store.product_stock(id).await, Some(0));
    }

    #[tokio::test]
    async fn test_fault_fires_once() {
        let store = MemoryStore::new();
        let id = store.insert_product(product(5)).await;
        store.inject(Fault::DecrementStock(id)).await;

        assert!(store.try_decrement_stock(id, 1).await.is_err());
        assert!(store.try_decrement_stock(id, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_resolve_token() {
        let store = MemoryStore::new();
        let user = store.insert_shopper("Ana", "ana@example.com", Role::Admin).await;
        store.insert_token("hash", user).await;

        let identity = store.resolve_token("hash").await.unwrap().unwrap();
        assert_eq!(identity.shopper, user);
        assert!(identity.is_admin());
        assert!(store.resolve_token("other").await.unwrap().is_none());
    }
}
