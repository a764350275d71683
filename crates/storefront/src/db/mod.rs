//! Persistence for the storefront.
//!
//! # Database: `ironmonger`
//!
//! Everything lives in the `storefront` schema:
//!
//! ## Tables
//!
//! - `shopper` / `api_token` - Accounts and hashed bearer tokens
//! - `product` / `size_variant` / `product_size` - Catalog
//! - `cart` / `cart_item` - One cart per shopper
//! - `customer_order` / `order_item` - Immutable orders
//! - `address` - Address book (at most one default per shopper)
//! - `wishlist_item` - Wishlist entries
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p ironmonger-cli -- migrate
//! ```
//!
//! # Stores
//!
//! Handlers and services only see the [`Store`] trait object. [`PgStore`] is
//! the production implementation. `MemoryStore` backs the test suites and is
//! only compiled for tests or with the `test-support` feature.

mod addresses;
mod carts;
mod catalog;
mod identity;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
mod orders;
mod wishlists;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use ironmonger_core::{
    AddressId, OrderId, OrderStatus, PaymentStatus, ProductId, UserId,
};

use crate::models::{
    Address, AddressFields, Cart, Identity, NewOrder, Order, Product, Shopper,
};

#[cfg(any(test, feature = "test-support"))]
pub use memory::{Fault, MemoryStore};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in database is invalid/corrupted.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Entity not found.
    #[error("not found")]
    NotFound,

    /// Conflict (e.g., duplicate key).
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Read-side catalog access plus the two stock mutations the order commit needs.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Products for the given ids. Unknown ids are skipped.
    async fn find_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError>;

    /// Take `quantity` units if at least that many are on hand.
    ///
    /// Returns `false` (and changes nothing) when stock is short or the
    /// product is gone. Check and decrement happen as one step.
    async fn try_decrement_stock(
        &self,
        id: ProductId,
        quantity: u32,
    ) -> Result<bool, RepositoryError>;

    /// Put units back after a failed commit.
    async fn restock(&self, id: ProductId, quantity: u32) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
    async fn find_cart(&self, user: UserId) -> Result<Option<Cart>, RepositoryError>;

    /// Replace the stored lines of the shopper's cart, creating it if needed.
    async fn save_cart(&self, cart: &Cart) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert with `pending`/`pending` status.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, RepositoryError>;

    async fn find_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// A shopper's orders, newest first.
    async fn list_orders_for(&self, user: UserId) -> Result<Vec<Order>, RepositoryError>;

    /// Every order, newest first.
    async fn list_all_orders(&self) -> Result<Vec<Order>, RepositoryError>;

    /// Overwrite whichever status fields are given. `None` if the order is absent.
    async fn update_order_status(
        &self,
        id: OrderId,
        status: Option<OrderStatus>,
        payment_status: Option<PaymentStatus>,
    ) -> Result<Option<Order>, RepositoryError>;
}

/// Address book persistence.
///
/// Every lookup is scoped to the owning shopper. Operations that set a
/// default demote the shopper's other addresses in the same step.
#[async_trait]
pub trait AddressStore: Send + Sync {
    /// Default first, then newest first.
    async fn list_addresses(&self, user: UserId) -> Result<Vec<Address>, RepositoryError>;

    async fn find_address(
        &self,
        user: UserId,
        id: AddressId,
    ) -> Result<Option<Address>, RepositoryError>;

    async fn count_addresses(&self, user: UserId) -> Result<u64, RepositoryError>;

    async fn insert_address(
        &self,
        user: UserId,
        fields: &AddressFields,
        make_default: bool,
    ) -> Result<Address, RepositoryError>;

    /// Write back an edited address. If it is flagged default, its siblings
    /// are demoted.
    async fn save_address(&self, address: &Address) -> Result<(), RepositoryError>;

    /// Returns the removed address, if it existed.
    async fn delete_address(
        &self,
        user: UserId,
        id: AddressId,
    ) -> Result<Option<Address>, RepositoryError>;

    /// Demote every address of the shopper, then promote `id`.
    /// Returns `false` if `id` is not the shopper's.
    async fn set_default_address(
        &self,
        user: UserId,
        id: AddressId,
    ) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait WishlistStore: Send + Sync {
    /// Product ids in the order they were added.
    async fn wishlist_products(&self, user: UserId) -> Result<Vec<ProductId>, RepositoryError>;

    /// Returns `false` if the product was already listed.
    async fn add_wishlist_product(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<bool, RepositoryError>;

    /// Returns `false` if the product was not listed.
    async fn remove_wishlist_product(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Look up an unexpired token by its hash.
    async fn resolve_token(&self, token_hash: &str) -> Result<Option<Identity>, RepositoryError>;

    async fn find_shoppers(&self, ids: &[UserId]) -> Result<Vec<Shopper>, RepositoryError>;
}

/// Everything the storefront persists.
#[async_trait]
pub trait Store:
    CatalogStore + CartStore + OrderStore + AddressStore + WishlistStore + IdentityStore
{
    /// Cheap reachability check for readiness probes.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// `PostgreSQL`-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Widen a stored count, rejecting negative values.
fn stored_count(value: i32, what: &str) -> Result<u32, RepositoryError> {
    u32::try_from(value)
        .map_err(|_| RepositoryError::DataCorruption(format!("negative {what} in database: {value}")))
}

/// Narrow a count for binding into an `INTEGER` column.
fn bind_count(value: u32) -> Result<i32, RepositoryError> {
    i32::try_from(value).map_err(|_| RepositoryError::Conflict(format!("count out of range: {value}")))
}

/// Parse a `TEXT` enum column.
fn stored_enum<T: std::str::FromStr<Err = String>>(value: &str) -> Result<T, RepositoryError> {
    value.parse().map_err(RepositoryError::DataCorruption)
}

/// Map unique violations to `Conflict`.
fn conflict_on_unique(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(err)
}
