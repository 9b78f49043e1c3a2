//! Site identity and promotional banner.
//!
//! Reads never fail the page: a missing document yields the defaults and a
//! failing read is logged and also yields the defaults.

use tracing::instrument;

use mrshopy_core::settings::{BannerSettings, PROMO_BANNER_KEY, SITE_INFO_KEY, SiteSettings};

use super::cache::{CacheKey, CacheValue};
use super::live::Collection;
use crate::db::{RepositoryError, SettingsRepository};
use crate::state::AppState;

pub struct SettingsService<'a> {
    state: &'a AppState,
}

impl<'a> SettingsService<'a> {
    #[must_use]
    pub const fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    fn repo(&self) -> SettingsRepository<'a> {
        SettingsRepository::new(self.state.pool())
    }

    pub async fn site(&self) -> SiteSettings {
        let loaded = self
            .state
            .cache()
            .get_or_load(CacheKey::SiteSettings, || async {
                let stored = self.repo().get::<SiteSettings>(SITE_INFO_KEY).await?;
                Ok::<_, RepositoryError>(CacheValue::SiteSettings(stored.unwrap_or_default()))
            })
            .await;
        match loaded {
            Ok(CacheValue::SiteSettings(site)) => site,
            Ok(_) => SiteSettings::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Falling back to default site settings");
                SiteSettings::default()
            }
        }
    }

    pub async fn banner(&self) -> BannerSettings {
        let loaded = self
            .state
            .cache()
            .get_or_load(CacheKey::Banner, || async {
                let stored = self.repo().get::<BannerSettings>(PROMO_BANNER_KEY).await?;
                Ok::<_, RepositoryError>(CacheValue::Banner(stored.unwrap_or_default()))
            })
            .await;
        match loaded {
            Ok(CacheValue::Banner(banner)) => banner,
            Ok(_) => BannerSettings::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Falling back to default banner");
                BannerSettings::default()
            }
        }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the write fails.
    #[instrument(skip(self))]
    pub async fn save_site(&self, site: &SiteSettings) -> Result<(), RepositoryError> {
        self.repo().put(SITE_INFO_KEY, site).await?;
        tracing::info!("Site settings saved");
        self.state.revalidate(Collection::Settings).await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the write fails.
    #[instrument(skip(self))]
    pub async fn save_banner(&self, banner: &BannerSettings) -> Result<(), RepositoryError> {
        self.repo().put(PROMO_BANNER_KEY, banner).await?;
        tracing::info!("Banner saved");
        self.state.revalidate(Collection::Settings).await;
        Ok(())
    }
}
