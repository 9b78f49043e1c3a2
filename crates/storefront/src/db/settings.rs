//! Singleton settings documents.

use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::PgPool;
use sqlx::types::Json;

use super::RepositoryError;

/// Repository for the `shop.setting` key/value table.
pub struct SettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingsRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Read a document, `None` when it was never written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored JSON has the wrong shape.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, RepositoryError> {
        let value: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT value FROM shop.setting WHERE key = $1")
                .bind(key)
                .fetch_optional(self.pool)
                .await?;

        value
            .map(|v| {
                serde_json::from_value(v).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid setting {key}: {e}"))
                })
            })
            .transpose()
    }

    /// Write a document, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn put<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO shop.setting (key, value) VALUES ($1, $2)
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
        )
        .bind(key)
        .bind(Json(value))
        .execute(self.pool)
        .await?;
        Ok(())
    }
}
