//! Ironmonger CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! im-cli migrate
//!
//! # Create a shopper (or an admin)
//! im-cli user create -e asha@example.com -n "Asha" -r admin
//!
//! # Issue a bearer token for a shopper
//! im-cli token issue -e asha@example.com --label laptop --expires-in-days 30
//!
//! # Load catalog products from YAML
//! im-cli seed products catalog.yaml
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "im-cli")]
#[command(author, version, about = "Ironmonger CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage shoppers
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage bearer tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new shopper
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Phone number
        #[arg(short, long)]
        phone: Option<String>,

        /// Role (`customer` or `admin`)
        #[arg(short, long, default_value = "customer")]
        role: String,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Issue a token for a shopper. The token is printed once.
    Issue {
        /// Shopper email address
        #[arg(short, long)]
        email: String,

        /// Free-form label, e.g. the device the token is for
        #[arg(short, long, default_value = "")]
        label: String,

        /// Days until the token expires (never, if omitted)
        #[arg(long)]
        expires_in_days: Option<u32>,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Load products with their size variants from a YAML file
    Products {
        /// Path to the YAML file
        file: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                phone,
                role,
            } => {
                commands::user::create(&email, &name, phone, &role).await?;
            }
        },
        Commands::Token { action } => match action {
            TokenAction::Issue {
                email,
                label,
                expires_in_days,
            } => commands::token::issue(&email, &label, expires_in_days).await?,
        },
        Commands::Seed { target } => match target {
            SeedTarget::Products { file } => commands::seed::products(&file).await?,
        },
    }
    Ok(())
}
