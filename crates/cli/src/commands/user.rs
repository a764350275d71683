//! Shopper management commands.
//!
//! # Usage
//!
//! ```bash
//! im-cli user create -e asha@example.com -n "Asha" -p 5550100 -r customer
//! ```

use ironmonger_core::{Role, UserId};
use ironmonger_storefront::db::RepositoryError;
use ironmonger_storefront::models::NewShopper;

use super::{CliError, connect};

/// Basic shape check; the address is never mailed.
fn validate_email(email: &str) -> Result<String, CliError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
            Ok(email.to_lowercase())
        }
        _ => Err(CliError::Invalid(format!("invalid email: {email}"))),
    }
}

/// Create a new shopper.
///
/// # Errors
///
/// Returns an error for an invalid email or role, or if the email is taken.
pub async fn create(
    email: &str,
    name: &str,
    phone: Option<String>,
    role: &str,
) -> Result<UserId, CliError> {
    let role: Role = role.parse().map_err(CliError::Invalid)?;
    let email = validate_email(email)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::Invalid("name must not be empty".to_owned()));
    }

    let store = connect().await?;
    tracing::info!("Creating shopper: {} ({})", email, role);

    let shopper = store
        .create_shopper(&NewShopper {
            name: name.to_owned(),
            email: email.clone(),
            phone: phone.filter(|p| !p.trim().is_empty()),
            role,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                CliError::Invalid(format!("a shopper already exists with email: {email}"))
            }
            other => other.into(),
        })?;

    tracing::info!(
        "Shopper created successfully! ID: {}, Email: {}, Role: {}",
        shopper.id,
        shopper.email,
        role
    );
    tracing::info!("Issue a token with: im-cli token issue -e {}", shopper.email);

    Ok(shopper.id)
}
