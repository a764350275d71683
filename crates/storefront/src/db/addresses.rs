//! Address book persistence.
//!
//! The partial unique index `address_one_default_idx` backs the
//! one-default-per-shopper rule, so every default change demotes siblings
//! first inside the same transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};

use ironmonger_core::{AddressId, UserId};

use super::{AddressStore, PgStore, RepositoryError};
use crate::models::{Address, AddressFields};

const ADDRESS_COLUMNS: &str = r"
    id, shopper_id, name, phone, address_line1, address_line2,
    city, state, postal_code, is_default, created_at
";

#[derive(sqlx::FromRow)]
struct AddressRow {
    id: AddressId,
    shopper_id: UserId,
    name: String,
    phone: String,
    address_line1: String,
    address_line2: Option<String>,
    city: String,
    state: String,
    postal_code: String,
    is_default: bool,
    created_at: DateTime<Utc>,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: row.id,
            user_id: row.shopper_id,
            name: row.name,
            phone: row.phone,
            address_line1: row.address_line1,
            address_line2: row.address_line2,
            city: row.city,
            state: row.state,
            postal_code: row.postal_code,
            is_default: row.is_default,
            created_at: row.created_at,
        }
    }
}

async fn demote_all(
    tx: &mut Transaction<'_, Postgres>,
    user: UserId,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "UPDATE storefront.address SET is_default = FALSE WHERE shopper_id = $1 AND is_default",
    )
    .bind(user)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait]
impl AddressStore for PgStore {
    async fn list_addresses(&self, user: UserId) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query_as::<_, AddressRow>(&format!(
            r"
            SELECT {ADDRESS_COLUMNS} FROM storefront.address
            WHERE shopper_id = $1
            ORDER BY is_default DESC, created_at DESC, id DESC
            "
        ))
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Address::from).collect())
    }

    async fn find_address(
        &self,
        user: UserId,
        id: AddressId,
    ) -> Result<Option<Address>, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM storefront.address WHERE id = $1 AND shopper_id = $2"
        ))
        .bind(id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Address::from))
    }

    async fn count_addresses(&self, user: UserId) -> Result<u64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM storefront.address WHERE shopper_id = $1")
                .bind(user)
                .fetch_one(&self.pool)
                .await?;

        u64::try_from(count)
            .map_err(|_| RepositoryError::DataCorruption(format!("negative count: {count}")))
    }

    async fn insert_address(
        &self,
        user: UserId,
        fields: &AddressFields,
        make_default: bool,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if make_default {
            demote_all(&mut tx, user).await?;
        }

        let row = sqlx::query_as::<_, AddressRow>(&format!(
            r"
            INSERT INTO storefront.address (
                shopper_id, name, phone, address_line1, address_line2,
                city, state, postal_code, is_default
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ADDRESS_COLUMNS}
            "
        ))
        .bind(user)
        .bind(&fields.name)
        .bind(&fields.phone)
        .bind(&fields.address_line1)
        .bind(&fields.address_line2)
        .bind(&fields.city)
        .bind(&fields.state)
        .bind(&fields.postal_code)
        .bind(make_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    async fn save_address(&self, address: &Address) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if address.is_default {
            demote_all(&mut tx, address.user_id).await?;
        }

        let result = sqlx::query(
            r"
            UPDATE storefront.address
            SET name = $3, phone = $4, address_line1 = $5, address_line2 = $6,
                city = $7, state = $8, postal_code = $9, is_default = $10
            WHERE id = $1 AND shopper_id = $2
            ",
        )
        .bind(address.id)
        .bind(address.user_id)
        .bind(&address.name)
        .bind(&address.phone)
        .bind(&address.address_line1)
        .bind(&address.address_line2)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.postal_code)
        .bind(address.is_default)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_address(
        &self,
        user: UserId,
        id: AddressId,
    ) -> Result<Option<Address>, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            r"
            DELETE FROM storefront.address
            WHERE id = $1 AND shopper_id = $2
            RETURNING {ADDRESS_COLUMNS}
            "
        ))
        .bind(id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Address::from))
    }

    async fn set_default_address(
        &self,
        user: UserId,
        id: AddressId,
    ) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        demote_all(&mut tx, user).await?;

        let result = sqlx::query(
            "UPDATE storefront.address SET is_default = TRUE WHERE id = $1 AND shopper_id = $2",
        )
        .bind(id)
        .bind(user)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls back the demotion.
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }
}
