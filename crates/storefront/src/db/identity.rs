//! Shopper accounts and bearer tokens.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use ironmonger_core::{Role, UserId};

use super::{IdentityStore, PgStore, RepositoryError, conflict_on_unique, stored_enum};
use crate::models::{Identity, NewShopper, Shopper};

#[derive(sqlx::FromRow)]
struct ShopperRow {
    id: UserId,
    name: String,
    email: String,
    phone: Option<String>,
}

impl From<ShopperRow> for Shopper {
    fn from(row: ShopperRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
        }
    }
}

#[async_trait]
impl IdentityStore for PgStore {
    async fn resolve_token(&self, token_hash: &str) -> Result<Option<Identity>, RepositoryError> {
        let row: Option<(UserId, String)> = sqlx::query_as(
            r"
            SELECT s.id, s.role
            FROM storefront.api_token t
            JOIN storefront.shopper s ON s.id = t.shopper_id
            WHERE t.token_hash = $1
              AND (t.expires_at IS NULL OR t.expires_at > now())
            ",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(shopper, role)| Ok(Identity::new(shopper, stored_enum::<Role>(&role)?)))
            .transpose()
    }

    async fn find_shoppers(&self, ids: &[UserId]) -> Result<Vec<Shopper>, RepositoryError> {
        let ids: Vec<i32> = ids.iter().map(UserId::as_i32).collect();
        let rows = sqlx::query_as::<_, ShopperRow>(
            "SELECT id, name, email, phone FROM storefront.shopper WHERE id = ANY($1) ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Shopper::from).collect())
    }
}

impl PgStore {
    /// Create a shopper account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_shopper(&self, new: &NewShopper) -> Result<Shopper, RepositoryError> {
        let row = sqlx::query_as::<_, ShopperRow>(
            r"
            INSERT INTO storefront.shopper (name, email, phone, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, phone
            ",
        )
        .bind(&new.name)
        .bind(new.email.trim().to_lowercase())
        .bind(&new.phone)
        .bind(new.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "email"))?;

        Ok(row.into())
    }

    /// Look up a shopper id by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_shopper_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserId>, RepositoryError> {
        let id = sqlx::query_scalar("SELECT id FROM storefront.shopper WHERE email = $1")
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }

    /// Store the hash of a freshly issued token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a hash collision.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert_token(
        &self,
        shopper: UserId,
        token_hash: &str,
        label: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO storefront.api_token (shopper_id, token_hash, label, expires_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(shopper)
        .bind(token_hash)
        .bind(label)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "token"))?;

        Ok(())
    }
}
