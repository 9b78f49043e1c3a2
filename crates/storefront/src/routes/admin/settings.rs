//! The two site-wide documents: identity (name, logo) and promo banner.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use mrshopy_core::roles::Area;
use mrshopy_core::settings::{BannerSettings, SiteSettings};

use crate::filters;
use crate::middleware::{RequireSuperAdmin, set_flash};
use crate::models::Flash;
use crate::routes::layout::{PageChrome, PanelNav};
use crate::services::SettingsService;
use crate::state::AppState;

// =============================================================================
// Banner
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "admin/banner.html")]
pub struct BannerTemplate {
    pub chrome: PageChrome,
    pub nav: PanelNav,
    pub banner: BannerSettings,
}

#[derive(Debug, Deserialize)]
pub struct BannerForm {
    #[serde(default)]
    pub text: String,
    /// Checkbox: present only when ticked.
    pub enabled: Option<String>,
}

impl From<BannerForm> for BannerSettings {
    fn from(form: BannerForm) -> Self {
        Self {
            text: form.text.trim().to_string(),
            enabled: form.enabled.is_some(),
        }
    }
}

#[instrument(skip_all)]
pub async fn banner_page(
    RequireSuperAdmin(user): RequireSuperAdmin,
    State(state): State<AppState>,
    session: Session,
) -> impl IntoResponse {
    BannerTemplate {
        banner: SettingsService::new(&state).banner().await,
        chrome: PageChrome::load(&state, Some(&user), &session).await,
        nav: PanelNav::new(Area::Admin, "banner"),
    }
}

#[instrument(skip_all)]
pub async fn save_banner(
    _admin: RequireSuperAdmin,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<BannerForm>,
) -> Redirect {
    let flash = match SettingsService::new(&state)
        .save_banner(&BannerSettings::from(form))
        .await
    {
        Ok(()) => Flash::success("Banner settings have been updated."),
        Err(e) => {
            tracing::error!(error = %e, "Saving banner failed");
            Flash::error("Could not save banner settings.")
        }
    };
    set_flash(&session, flash).await;
    Redirect::to("/admin/banner")
}

// =============================================================================
// Site identity
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "admin/settings.html")]
pub struct SiteSettingsTemplate {
    pub chrome: PageChrome,
    pub nav: PanelNav,
    pub site: SiteSettings,
}

#[derive(Debug, Deserialize)]
pub struct SiteSettingsForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub logo_url: String,
}

impl From<SiteSettingsForm> for SiteSettings {
    fn from(form: SiteSettingsForm) -> Self {
        Self {
            name: form.name.trim().to_string(),
            logo_url: form.logo_url.trim().to_string(),
        }
    }
}

#[instrument(skip_all)]
pub async fn settings_page(
    RequireSuperAdmin(user): RequireSuperAdmin,
    State(state): State<AppState>,
    session: Session,
) -> impl IntoResponse {
    SiteSettingsTemplate {
        site: SettingsService::new(&state).site().await,
        chrome: PageChrome::load(&state, Some(&user), &session).await,
        nav: PanelNav::new(Area::Admin, "settings"),
    }
}

#[instrument(skip_all)]
pub async fn save_settings(
    _admin: RequireSuperAdmin,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SiteSettingsForm>,
) -> Redirect {
    let flash = match SettingsService::new(&state)
        .save_site(&SiteSettings::from(form))
        .await
    {
        Ok(()) => Flash::success("Site settings have been updated."),
        Err(e) => {
            tracing::error!(error = %e, "Saving site settings failed");
            Flash::error("Could not save site settings.")
        }
    };
    set_flash(&session, flash).await;
    Redirect::to("/admin/settings")
}
