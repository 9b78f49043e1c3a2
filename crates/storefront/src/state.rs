//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ShopConfig;
use crate::content::ContentStore;
use crate::services::cache::ReadCache;
use crate::services::google::GoogleClient;
use crate::services::images::ImageUploader;
use crate::services::live::{Collection, LiveFeed};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ShopConfig,
    pool: PgPool,
    content: ContentStore,
    cache: ReadCache,
    live: LiveFeed,
    images: Option<ImageUploader>,
    google: Option<GoogleClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Image uploads and Google sign-in are enabled when their credentials
    /// are configured.
    #[must_use]
    pub fn new(config: ShopConfig, pool: PgPool, content: ContentStore) -> Self {
        let images = config.cloudinary.as_ref().map(ImageUploader::new);
        let google = config
            .google
            .as_ref()
            .map(|google| GoogleClient::new(google, &config.base_url));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                content,
                cache: ReadCache::new(),
                live: LiveFeed::new(),
                images,
                google,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ShopConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }

    #[must_use]
    pub fn cache(&self) -> &ReadCache {
        &self.inner.cache
    }

    #[must_use]
    pub fn live(&self) -> &LiveFeed {
        &self.inner.live
    }

    /// Image uploader, when Cloudinary is configured.
    #[must_use]
    pub fn images(&self) -> Option<&ImageUploader> {
        self.inner.images.as_ref()
    }

    /// Google sign-in client, when configured.
    #[must_use]
    pub fn google(&self) -> Option<&GoogleClient> {
        self.inner.google.as_ref()
    }

    /// Invalidate cached reads of `collection` and notify live subscribers.
    ///
    /// Called after every successful write.
    pub async fn revalidate(&self, collection: Collection) {
        self.inner.cache.invalidate(collection).await;
        self.inner.live.publish(collection);
    }
}
