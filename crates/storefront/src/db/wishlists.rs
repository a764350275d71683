//! Wishlist persistence.

use async_trait::async_trait;

use ironmonger_core::{ProductId, UserId};

use super::{PgStore, RepositoryError, WishlistStore};

#[async_trait]
impl WishlistStore for PgStore {
    async fn wishlist_products(&self, user: UserId) -> Result<Vec<ProductId>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, ProductId>(
            r"
            SELECT product_id FROM storefront.wishlist_item
            WHERE shopper_id = $1
            ORDER BY added_at, product_id
            ",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn add_wishlist_product(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO storefront.wishlist_item (shopper_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT (shopper_id, product_id) DO NOTHING
            ",
        )
        .bind(user)
        .bind(product)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn remove_wishlist_product(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM storefront.wishlist_item WHERE shopper_id = $1 AND product_id = $2",
        )
        .bind(user)
        .bind(product)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
