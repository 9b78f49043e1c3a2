//! Subcommand implementations.

pub mod migrate;
pub mod roles;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Session store migration error.
    #[error("Session store error: {0}")]
    SessionStore(#[from] tower_sessions_sqlx_store::SqlxStoreError),

    /// Repository error from the storefront data layer.
    #[error("Repository error: {0}")]
    Repository(#[from] mrshopy_storefront::db::RepositoryError),

    /// Seed file could not be read.
    #[error("Could not read {path}: {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Seed file is not valid YAML of the expected shape.
    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// One or more seed products failed validation.
    #[error("{0} invalid product(s) in seed file")]
    InvalidProducts(usize),
}

/// Connect to the shop database named by the environment.
///
/// # Errors
///
/// Returns an error if no database URL is set or the connection fails.
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("SHOP_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("SHOP_DATABASE_URL"))?;

    tracing::info!("Connecting to shop database...");
    Ok(mrshopy_storefront::db::create_pool(&database_url).await?)
}
