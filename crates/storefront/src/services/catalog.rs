//! Catalog reads (cached) and revalidating writes.

use std::sync::Arc;

use tracing::instrument;

use mrshopy_core::ProductId;
use mrshopy_core::catalog::{Product, ProductDraft};

use super::cache::{CacheKey, CacheValue};
use super::live::Collection;
use crate::db::{ProductRepository, RepositoryError};
use crate::state::AppState;

/// Catalog operations shared by the storefront and both panels.
pub struct CatalogService<'a> {
    state: &'a AppState,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    fn repo(&self) -> ProductRepository<'a> {
        ProductRepository::new(self.state.pool())
    }

    /// All products, newest first, served from the read cache when warm.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the cache is cold and the query fails.
    pub async fn list(&self) -> Result<Arc<Vec<Product>>, RepositoryError> {
        let cached = self
            .state
            .cache()
            .get_or_load(CacheKey::Products, || async {
                let products = self.repo().list().await?;
                Ok::<_, RepositoryError>(CacheValue::Products(Arc::new(products)))
            })
            .await?;
        match cached {
            CacheValue::Products(products) => Ok(products),
            _ => Ok(Arc::new(self.repo().list().await?)),
        }
    }

    /// One product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        self.repo().get(id).await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the insert fails.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create(&self, draft: &ProductDraft) -> Result<Product, RepositoryError> {
        let product = self.repo().create(draft).await?;
        tracing::info!(product_id = %product.id, "Product created");
        self.state.revalidate(Collection::Products).await;
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is gone.
    #[instrument(skip(self, draft))]
    pub async fn update(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, RepositoryError> {
        let product = self.repo().update(id, draft).await?;
        tracing::info!("Product updated");
        self.state.revalidate(Collection::Products).await;
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is gone.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        self.repo().delete(id).await?;
        tracing::info!("Product deleted");
        self.state.revalidate(Collection::Products).await;
        Ok(())
    }

    /// Insert a batch of products atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if any insert fails; nothing is added.
    #[instrument(skip(self, drafts), fields(count = drafts.len()))]
    pub async fn seed(&self, drafts: &[ProductDraft]) -> Result<usize, RepositoryError> {
        let added = self.repo().create_many(drafts).await?;
        tracing::info!(added, "Catalog seeded");
        self.state.revalidate(Collection::Products).await;
        Ok(added)
    }
}
