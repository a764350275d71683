//! Catalog queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use ironmonger_core::{ProductId, SizeId};

use super::{CatalogStore, PgStore, RepositoryError, bind_count, stored_count, stored_enum};
use crate::models::{NewProduct, Product, SizeVariant};

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: Option<String>,
    price: Decimal,
    stock: i32,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct SizeRow {
    for_product: ProductId,
    id: SizeId,
    name: String,
    value: String,
    product_id: Option<ProductId>,
    status: String,
}

impl SizeRow {
    fn into_variant(self) -> Result<SizeVariant, RepositoryError> {
        Ok(SizeVariant {
            id: self.id,
            name: self.name,
            value: self.value,
            product_id: self.product_id,
            status: stored_enum(&self.status)?,
        })
    }
}

/// Load products with their size variants, in id order.
async fn load_products(pool: &PgPool, ids: &[i32]) -> Result<Vec<Product>, RepositoryError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, ProductRow>(
        r"
        SELECT id, name, description, price, stock, status, created_at, updated_at
        FROM storefront.product
        WHERE id = ANY($1)
        ORDER BY id
        ",
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    let sizes = sqlx::query_as::<_, SizeRow>(
        r"
        SELECT ps.product_id AS for_product, s.id, s.name, s.value, s.product_id, s.status
        FROM storefront.product_size ps
        JOIN storefront.size_variant s ON s.id = ps.size_id
        WHERE ps.product_id = ANY($1)
        ORDER BY ps.product_id, ps.position, s.id
        ",
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    let mut products = Vec::with_capacity(rows.len());
    for row in rows {
        products.push(Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            stock: stored_count(row.stock, "stock")?,
            sizes: Vec::new(),
            status: stored_enum(&row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        });
    }

    for size in sizes {
        if let Some(product) = products.iter_mut().find(|p| p.id == size.for_product) {
            product.sizes.push(size.into_variant()?);
        }
    }

    Ok(products)
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(load_products(&self.pool, &[id.as_i32()]).await?.into_iter().next())
    }

    async fn find_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        load_products(&self.pool, &ids).await
    }

    async fn try_decrement_stock(
        &self,
        id: ProductId,
        quantity: u32,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE storefront.product
            SET stock = stock - $2, updated_at = now()
            WHERE id = $1 AND stock >= $2
            ",
        )
        .bind(id)
        .bind(bind_count(quantity)?)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn restock(&self, id: ProductId, quantity: u32) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            UPDATE storefront.product
            SET stock = stock + $2, updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(bind_count(quantity)?)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl PgStore {
    /// Insert a product and its size variants.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails.
    pub async fn create_product(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id: ProductId = sqlx::query_scalar(
            r"
            INSERT INTO storefront.product (name, description, price, stock)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(bind_count(new.stock)?)
        .fetch_one(&mut *tx)
        .await?;

        for (position, size) in (0_i32..).zip(&new.sizes) {
            let size_id: SizeId = sqlx::query_scalar(
                r"
                INSERT INTO storefront.size_variant (name, value, product_id)
                VALUES ($1, $2, $3)
                RETURNING id
                ",
            )
            .bind(&size.name)
            .bind(&size.value)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                r"
                INSERT INTO storefront.product_size (product_id, size_id, position)
                VALUES ($1, $2, $3)
                ",
            )
            .bind(id)
            .bind(size_id)
            .bind(position)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.find_product(id).await?.ok_or(RepositoryError::NotFound)
    }
}
