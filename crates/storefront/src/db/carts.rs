//! Cart persistence.
//!
//! Lines are rewritten wholesale on every save; the cart total is never stored.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use ironmonger_core::{CartLineId, ProductId, SizeId, UserId};

use super::{CartStore, PgStore, RepositoryError, bind_count, stored_count};
use crate::models::{Cart, CartItem};

#[derive(sqlx::FromRow)]
struct CartItemRow {
    id: Uuid,
    product_id: ProductId,
    quantity: i32,
    price: Decimal,
    size_id: Option<SizeId>,
}

#[async_trait]
impl CartStore for PgStore {
    async fn find_cart(&self, user: UserId) -> Result<Option<Cart>, RepositoryError> {
        let updated_at: Option<DateTime<Utc>> = sqlx::query_scalar(
            "SELECT updated_at FROM storefront.cart WHERE shopper_id = $1",
        )
        .bind(user)
        .fetch_optional(&self.pool)
        .await?;

        let Some(updated_at) = updated_at else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, CartItemRow>(
            r"
            SELECT id, product_id, quantity, price, size_id
            FROM storefront.cart_item
            WHERE shopper_id = $1
            ORDER BY position
            ",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(|row| {
                Ok(CartItem {
                    id: CartLineId::from_uuid(row.id),
                    product_id: row.product_id,
                    quantity: stored_count(row.quantity, "cart quantity")?,
                    price: row.price,
                    selected_size: row.size_id,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        Ok(Some(Cart::from_parts(user, items, updated_at)))
    }

    async fn save_cart(&self, cart: &Cart) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO storefront.cart (shopper_id, updated_at)
            VALUES ($1, $2)
            ON CONFLICT (shopper_id) DO UPDATE SET updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(cart.user_id())
        .bind(cart.updated_at())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM storefront.cart_item WHERE shopper_id = $1")
            .bind(cart.user_id())
            .execute(&mut *tx)
            .await?;

        for (position, item) in (0_i32..).zip(cart.items()) {
            sqlx::query(
                r"
                INSERT INTO storefront.cart_item
                    (id, shopper_id, position, product_id, quantity, price, size_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ",
            )
            .bind(item.id.as_uuid())
            .bind(cart.user_id())
            .bind(position)
            .bind(item.product_id)
            .bind(bind_count(item.quantity)?)
            .bind(item.price)
            .bind(item.selected_size)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
