//! Bearer token commands.
//!
//! # Usage
//!
//! ```bash
//! im-cli token issue -e asha@example.com --label laptop --expires-in-days 30
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string
//! - `STOREFRONT_TOKEN_PEPPER` - Must match the server's pepper

use chrono::{Duration, Utc};
use secrecy::ExposeSecret;

use ironmonger_storefront::config::StorefrontConfig;
use ironmonger_storefront::db::{self, PgStore};
use ironmonger_storefront::services::tokens::{generate_token, hash_token};

use super::CliError;

/// Issue a token for the shopper with `email` and print it.
///
/// Only the peppered hash is stored, so the printed value cannot be
/// recovered later.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the shopper does not exist
/// or the database write fails.
pub async fn issue(email: &str, label: &str, expires_in_days: Option<u32>) -> Result<(), CliError> {
    let config = StorefrontConfig::from_env()?;
    let store = PgStore::new(db::create_pool(&config.database_url).await?);

    let shopper = store
        .find_shopper_by_email(email)
        .await?
        .ok_or_else(|| CliError::UnknownShopper(email.to_owned()))?;

    let expires_at = expires_in_days.map(|days| Utc::now() + Duration::days(i64::from(days)));
    let token = generate_token();
    store
        .insert_token(
            shopper,
            &hash_token(&config.token_pepper, token.expose_secret()),
            label.trim(),
            expires_at,
        )
        .await?;

    tracing::info!(shopper_id = %shopper, ?expires_at, "Token issued");

    #[allow(clippy::print_stdout)]
    {
        println!("{}", token.expose_secret());
    }

    Ok(())
}
