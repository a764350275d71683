//! Order persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use ironmonger_core::{OrderId, OrderStatus, PaymentStatus, ProductId, UserId};

use super::{OrderStore, PgStore, RepositoryError, bind_count, stored_count, stored_enum};
use crate::models::{NewOrder, Order, OrderItem, ShippingAddress};

const ORDER_COLUMNS: &str = r"
    id, shopper_id, total,
    ship_name, ship_phone, ship_address_line1, ship_address_line2,
    ship_city, ship_state, ship_postal_code,
    payment_method, payment_evidence, status, payment_status, created_at
";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    shopper_id: UserId,
    total: Decimal,
    ship_name: String,
    ship_phone: String,
    ship_address_line1: String,
    ship_address_line2: Option<String>,
    ship_city: String,
    ship_state: String,
    ship_postal_code: String,
    payment_method: String,
    payment_evidence: Option<String>,
    status: String,
    payment_status: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    order_id: OrderId,
    product_id: ProductId,
    quantity: i32,
    price: Decimal,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
        Ok(Order {
            id: self.id,
            user_id: self.shopper_id,
            items,
            total: self.total,
            shipping_address: ShippingAddress {
                name: self.ship_name,
                phone: self.ship_phone,
                address_line1: self.ship_address_line1,
                address_line2: self.ship_address_line2,
                city: self.ship_city,
                state: self.ship_state,
                postal_code: self.ship_postal_code,
            },
            payment_method: stored_enum(&self.payment_method)?,
            payment_evidence: self.payment_evidence,
            status: stored_enum(&self.status)?,
            payment_status: stored_enum(&self.payment_status)?,
            created_at: self.created_at,
        })
    }
}

/// Attach items to order rows, keeping row order.
async fn with_items(pool: &PgPool, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = rows.iter().map(|row| row.id.as_i32()).collect();
    let item_rows = sqlx::query_as::<_, OrderItemRow>(
        r"
        SELECT order_id, product_id, quantity, price
        FROM storefront.order_item
        WHERE order_id = ANY($1)
        ORDER BY order_id, position
        ",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let items = item_rows
                .iter()
                .filter(|item| item.order_id == row.id)
                .map(|item| {
                    Ok(OrderItem {
                        product_id: item.product_id,
                        quantity: stored_count(item.quantity, "order quantity")?,
                        price: item.price,
                    })
                })
                .collect::<Result<Vec<_>, RepositoryError>>()?;
            row.into_order(items)
        })
        .collect()
}

#[async_trait]
impl OrderStore for PgStore {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO storefront.customer_order (
                shopper_id, total,
                ship_name, ship_phone, ship_address_line1, ship_address_line2,
                ship_city, ship_state, ship_postal_code,
                payment_method, payment_evidence, status, payment_status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(order.user_id)
        .bind(order.total)
        .bind(&order.shipping_address.name)
        .bind(&order.shipping_address.phone)
        .bind(&order.shipping_address.address_line1)
        .bind(&order.shipping_address.address_line2)
        .bind(&order.shipping_address.city)
        .bind(&order.shipping_address.state)
        .bind(&order.shipping_address.postal_code)
        .bind(order.payment_method.as_str())
        .bind(&order.payment_evidence)
        .bind(OrderStatus::Pending.as_str())
        .bind(PaymentStatus::Pending.as_str())
        .fetch_one(&mut *tx)
        .await?;

        for (position, item) in (0_i32..).zip(&order.items) {
            sqlx::query(
                r"
                INSERT INTO storefront.order_item (order_id, position, product_id, quantity, price)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(row.id)
            .bind(position)
            .bind(item.product_id)
            .bind(bind_count(item.quantity)?)
            .bind(item.price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        row.into_order(order.items)
    }

    async fn find_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.customer_order WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(with_items(&self.pool, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_orders_for(&self, user: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS} FROM storefront.customer_order
            WHERE shopper_id = $1
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        with_items(&self.pool, rows).await
    }

    async fn list_all_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS} FROM storefront.customer_order
            ORDER BY created_at DESC, id DESC
            "
        ))
        .fetch_all(&self.pool)
        .await?;

        with_items(&self.pool, rows).await
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: Option<OrderStatus>,
        payment_status: Option<PaymentStatus>,
    ) -> Result<Option<Order>, RepositoryError> {
        let updated = sqlx::query(
            r"
            UPDATE storefront.customer_order
            SET status = COALESCE($2, status),
                payment_status = COALESCE($3, payment_status)
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(status.map(|s| s.as_str()))
        .bind(payment_status.map(|s| s.as_str()))
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_order(id).await
    }
}
