//! Database migration command.
//!
//! Applies `crates/storefront/migrations/` (schema `shop`) and creates the
//! session table used by the web server.

use tower_sessions_sqlx_store::PostgresStore;

use super::{CommandError, connect};

/// Run all migrations.
///
/// # Errors
///
/// Returns an error if the connection or any migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running shop migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Creating session store table...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
