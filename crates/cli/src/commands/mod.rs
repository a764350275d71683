//! CLI subcommands.

pub mod migrate;
pub mod seed;
pub mod token;
pub mod user;

use secrecy::SecretString;
use thiserror::Error;

use ironmonger_storefront::config::ConfigError;
use ironmonger_storefront::db::{self, PgStore, RepositoryError};

/// Errors shared by all commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("No shopper with email: {0}")]
    UnknownShopper(String),

    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Database URL from `STOREFRONT_DATABASE_URL`, falling back to `DATABASE_URL`.
fn database_url() -> Result<SecretString, CliError> {
    dotenvy::dotenv().ok();
    std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("STOREFRONT_DATABASE_URL"))
}

/// Connect a store from the environment.
async fn connect() -> Result<PgStore, CliError> {
    let url = database_url()?;
    tracing::info!("Connecting to storefront database...");
    let pool = db::create_pool(&url).await?;
    Ok(PgStore::new(pool))
}
