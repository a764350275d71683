//! Database migration command.
//!
//! Applies `crates/storefront/migrations/` to `STOREFRONT_DATABASE_URL`
//! (or `DATABASE_URL`). The server never migrates on startup.

use super::{CliError, connect};

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let store = connect().await?;

    tracing::info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations")
        .run(store.pool())
        .await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
