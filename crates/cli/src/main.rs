//! MRSHOPY CLI - database migrations and shop management tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the shop schema and the session table
//! mrshopy-cli migrate
//!
//! # Add the four sample products
//! mrshopy-cli seed
//!
//! # Add products from a YAML file
//! mrshopy-cli seed --file products.yaml
//!
//! # Show who can reach /admin and /staff
//! mrshopy-cli roles
//! ```
//!
//! # Environment Variables
//!
//! - `SHOP_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mrshopy-cli")]
#[command(author, version, about = "MRSHOPY CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations (shop schema and session store)
    Migrate,
    /// Add products to the catalog
    Seed {
        /// YAML file with a `products` list; the built-in samples when omitted
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// List the super-admin and staff allowlists
    Roles,
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

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => {
            commands::seed::run(file.as_deref()).await?;
        }
        Commands::Roles => commands::roles::print(),
    }
    Ok(())
}
