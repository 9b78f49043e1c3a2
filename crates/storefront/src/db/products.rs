//! Product repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use mrshopy_core::ProductId;
use mrshopy_core::catalog::{Product, ProductDraft};
use mrshopy_core::types::Price;

use super::RepositoryError;

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, stock, image_url, category, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Decimal,
    stock: i32,
    image_url: String,
    category: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: Price::new(row.price),
            stock: row.stock,
            image_url: row.image_url,
            category: row.category,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for catalog database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM shop.product ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM shop.product WHERE id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Product::from))
    }

    /// Insert a validated product with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, draft: &ProductDraft) -> Result<Product, RepositoryError> {
        let sql = format!(
            "INSERT INTO shop.product (id, name, description, price, stock, image_url, category)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(ProductId::new_random())
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.price.amount())
            .bind(draft.stock)
            .bind(&draft.image_url)
            .bind(&draft.category)
            .fetch_one(self.pool)
            .await?;
        Ok(row.into())
    }

    /// Replace every editable field of an existing product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this id.
    pub async fn update(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, RepositoryError> {
        let sql = format!(
            "UPDATE shop.product
             SET name = $2, description = $3, price = $4, stock = $5,
                 image_url = $6, category = $7, updated_at = NOW()
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        );
        sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.price.amount())
            .bind(draft.stock)
            .bind(&draft.image_url)
            .bind(&draft.category)
            .fetch_optional(self.pool)
            .await?
            .map(Product::from)
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product. Orders keep their item snapshots.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this id.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Insert a batch of products in one transaction, returning how many were added.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails; nothing is kept.
    pub async fn create_many(&self, drafts: &[ProductDraft]) -> Result<usize, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        for draft in drafts {
            sqlx::query(
                "INSERT INTO shop.product (id, name, description, price, stock, image_url, category)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(ProductId::new_random())
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.price.amount())
            .bind(draft.stock)
            .bind(&draft.image_url)
            .bind(&draft.category)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(drafts.len())
    }
}
