//! Read-model cache for the catalog and settings documents.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;

use mrshopy_core::catalog::Product;
use mrshopy_core::settings::{BannerSettings, SiteSettings};

use super::live::Collection;

/// Cache key for read models.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    SiteSettings,
    Banner,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Arc<Vec<Product>>),
    SiteSettings(SiteSettings),
    Banner(BannerSettings),
}

impl CacheKey {
    const COUNT: usize = 3;

    const fn slot(self) -> usize {
        match self {
            Self::Products => 0,
            Self::SiteSettings => 1,
            Self::Banner => 2,
        }
    }

    /// Keys whose cached value depends on `collection`.
    #[must_use]
    pub const fn affected_by(collection: Collection) -> &'static [Self] {
        match collection {
            Collection::Products => &[Self::Products],
            Collection::Settings => &[Self::SiteSettings, Self::Banner],
            Collection::Orders | Collection::Profiles => &[],
        }
    }
}

/// Shared read-model cache (5 minute TTL).
///
/// Every key carries a generation that `invalidate` bumps. A load that began
/// before an invalidation never repopulates the entry with its result.
#[derive(Clone)]
pub struct ReadCache {
    inner: Cache<CacheKey, CacheValue>,
    generations: Arc<[AtomicU64; CacheKey::COUNT]>,
}

impl Default for ReadCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(16)
                .time_to_live(Duration::from_secs(300))
                .build(),
            generations: Arc::new(std::array::from_fn(|_| AtomicU64::new(0))),
        }
    }

    fn generation(&self, key: CacheKey) -> u64 {
        self.generations[key.slot()].load(Ordering::SeqCst)
    }

    /// Cached value for `key`, or the result of `load`.
    ///
    /// The loaded value is cached only when no invalidation of `key` happened
    /// while it was being read.
    ///
    /// # Errors
    ///
    /// Returns the loader's error; nothing is cached in that case.
    pub async fn get_or_load<F, Fut, E>(&self, key: CacheKey, load: F) -> Result<CacheValue, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CacheValue, E>>,
    {
        if let Some(value) = self.inner.get(&key).await {
            return Ok(value);
        }

        let started = self.generation(key);
        let value = load().await?;
        if self.generation(key) == started {
            self.inner.insert(key, value.clone()).await;
            if self.generation(key) != started {
                self.inner.invalidate(&key).await;
            }
        } else {
            tracing::debug!(?key, "Skipping cache fill after concurrent invalidation");
        }
        Ok(value)
    }

    pub async fn get(&self, key: CacheKey) -> Option<CacheValue> {
        self.inner.get(&key).await
    }

    pub async fn insert(&self, key: CacheKey, value: CacheValue) {
        self.inner.insert(key, value).await;
    }

    /// Drop every entry derived from `collection`.
    pub async fn invalidate(&self, collection: Collection) {
        for key in CacheKey::affected_by(collection) {
            self.generations[key.slot()].fetch_add(1, Ordering::SeqCst);
            self.inner.invalidate(key).await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalidate_drops_only_affected_keys() {
        let cache = ReadCache::new();
        cache
            .insert(CacheKey::Products, CacheValue::Products(Arc::new(Vec::new())))
            .await;
        cache
            .insert(
                CacheKey::Banner,
                CacheValue::Banner(BannerSettings::default()),
            )
            .await;

        cache.invalidate(Collection::Orders).await;
        assert!(cache.get(CacheKey::Products).await.is_some());

        cache.invalidate(Collection::Products).await;
        assert!(cache.get(CacheKey::Products).await.is_none());
        assert!(cache.get(CacheKey::Banner).await.is_some());

        cache.invalidate(Collection::Settings).await;
        assert!(cache.get(CacheKey::Banner).await.is_none());
    }

    #[tokio::test]
    async fn test_load_racing_an_invalidation_is_not_cached() {
        let cache = ReadCache::new();

        let stale = cache
            .get_or_load(CacheKey::Products, || async {
                // A write lands while the old snapshot is still being read.
                cache.invalidate(Collection::Products).await;
                Ok::<_, ()>(CacheValue::Products(Arc::new(Vec::new())))
            })
            .await;
        assert!(stale.is_ok());
        assert!(cache.get(CacheKey::Products).await.is_none());

        let fresh = cache
            .get_or_load(CacheKey::Products, || async {
                Ok::<_, ()>(CacheValue::Products(Arc::new(Vec::new())))
            })
            .await;
        assert!(fresh.is_ok());
        assert!(cache.get(CacheKey::Products).await.is_some());
    }

    #[tokio::test]
    async fn test_failed_load_leaves_cache_cold() {
        let cache = ReadCache::new();
        let result = cache
            .get_or_load(CacheKey::Banner, || async { Err::<CacheValue, _>("db down") })
            .await;
        assert_eq!(result.unwrap_err(), "db down");
        assert!(cache.get(CacheKey::Banner).await.is_none());
    }
}
