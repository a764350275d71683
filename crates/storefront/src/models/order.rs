//! Order records.
//!
//! An order is immutable once created apart from `status` and
//! `payment_status`, which only a privileged actor changes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ironmonger_core::{
    OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, UserId, line_total,
};

use super::address::Address;
use super::identity::Shopper;
use super::product::Product;

/// One ordered line; the price is a snapshot taken at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Decimal,
}

/// Where the order ships to, copied into the order at creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingAddress {
    pub name: String,
    pub phone: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    #[serde(alias = "pincode")]
    pub postal_code: String,
}

impl From<&Address> for ShippingAddress {
    fn from(address: &Address) -> Self {
        Self {
            name: address.name.clone(),
            phone: address.phone.clone(),
            address_line1: address.address_line1.clone(),
            address_line2: address.address_line2.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            postal_code: address.postal_code.clone(),
        }
    }
}

/// A stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub payment_evidence: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to insert an order. Status fields start `pending`.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub payment_evidence: Option<String>,
}

/// Ordered line with its product resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
    pub product_id: ProductId,
    pub product: Option<Product>,
    pub quantity: u32,
    pub price: Decimal,
    pub line_total: Decimal,
}

/// Order response body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: OrderId,
    pub user_id: UserId,
    /// Only filled in for the privileged all-orders listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shopper: Option<Shopper>,
    pub items: Vec<OrderItemView>,
    pub total: Decimal,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub payment_evidence: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl OrderView {
    /// Resolve products (and optionally the shopper) for one order.
    #[must_use]
    pub fn build(order: Order, products: &[Product], shopper: Option<Shopper>) -> Self {
        let items = order
            .items
            .iter()
            .map(|item| OrderItemView {
                product_id: item.product_id,
                product: products.iter().find(|p| p.id == item.product_id).cloned(),
                quantity: item.quantity,
                price: item.price,
                line_total: line_total(item.price, item.quantity),
            })
            .collect();

        Self {
            id: order.id,
            user_id: order.user_id,
            shopper,
            items,
            total: order.total,
            shipping_address: order.shipping_address,
            payment_method: order.payment_method,
            payment_evidence: order.payment_evidence,
            status: order.status,
            payment_status: order.payment_status,
            created_at: order.created_at,
        }
    }
}
