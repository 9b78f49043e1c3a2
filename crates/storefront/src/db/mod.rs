//! Database operations for the shop `PostgreSQL` schema.
//!
//! # Schema: `shop`
//!
//! ## Tables
//!
//! - `product` - Catalog
//! - `orders` - Orders with a JSONB snapshot of their line items
//! - `user_profile` - One row per signed-in user, keyed by email
//! - `user_password` - Argon2 hashes for email/password accounts
//! - `setting` - Singleton JSON documents (`siteInfo`, `promoBanner`)
//!
//! Sessions live in `tower_sessions.session`, created by the session store's
//! own migration.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p mrshopy-cli -- migrate
//! ```

pub mod orders;
pub mod products;
pub mod settings;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use settings::SettingsRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value no longer parses into its domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Record not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violated.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Map unique violations to [`RepositoryError::Conflict`].
pub(crate) fn conflict_on_unique(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
