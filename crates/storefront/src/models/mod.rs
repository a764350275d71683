//! Domain models for the storefront.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db`].

pub mod address;
pub mod cart;
pub mod identity;
pub mod order;
pub mod product;
pub mod wishlist;

pub use address::{Address, AddressFields, AddressInput};
pub use cart::{Cart, CartItem, CartItemView, CartView};
pub use identity::{Identity, NewShopper, Shopper};
pub use order::{NewOrder, Order, OrderItem, OrderItemView, OrderView, ShippingAddress};
pub use product::{NewProduct, NewSize, Product, SizeVariant};
pub use wishlist::WishlistView;
