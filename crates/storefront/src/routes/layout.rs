//! Data shared by every page: site identity, banner, signed-in user, notice.

use tower_sessions::Session;

use mrshopy_core::roles::{self, Area};

use crate::middleware::take_flash;
use crate::models::{CurrentUser, Flash};
use crate::services::SettingsService;
use crate::state::AppState;

/// Signed-in user as shown in the header.
#[derive(Debug, Clone)]
pub struct NavUser {
    pub display_name: String,
    pub email: String,
    pub initials: String,
    pub photo_url: Option<String>,
    pub is_admin: bool,
    pub is_staff: bool,
}

impl From<&CurrentUser> for NavUser {
    fn from(user: &CurrentUser) -> Self {
        Self {
            display_name: user.display_name.clone(),
            email: user.email.to_string(),
            initials: mrshopy_core::reviews::initials(&user.display_name),
            photo_url: user.photo_url.clone(),
            is_admin: roles::is_super_admin(&user.email),
            is_staff: roles::is_staff(&user.email),
        }
    }
}

/// Header, banner and footer data for `base.html` and `panel.html`.
#[derive(Debug, Clone)]
pub struct PageChrome {
    pub site_name: String,
    pub logo_url: String,
    pub banner: Option<String>,
    pub user: Option<NavUser>,
    pub flash: Option<Flash>,
    /// SSE endpoint that reloads this page when its data changes.
    pub live: Option<&'static str>,
}

impl PageChrome {
    /// Load the chrome for a request, consuming any pending notice.
    pub async fn load(state: &AppState, user: Option<&CurrentUser>, session: &Session) -> Self {
        let settings = SettingsService::new(state);
        let site = settings.site().await;
        let banner = settings.banner().await;

        Self {
            site_name: site.name.clone(),
            logo_url: site.logo().to_string(),
            banner: banner.visible_text().map(str::to_string),
            user: user.map(NavUser::from),
            flash: take_flash(session).await,
            live: None,
        }
    }

    /// Subscribe the page to a live stream.
    #[must_use]
    pub fn live(mut self, endpoint: &'static str) -> Self {
        self.live = Some(endpoint);
        self
    }
}

/// Sidebar of the admin and staff panels.
#[derive(Debug, Clone, Copy)]
pub struct PanelNav {
    /// `/admin` or `/staff`.
    pub base: &'static str,
    pub title: &'static str,
    pub is_admin: bool,
    /// Sidebar entry to highlight.
    pub active: &'static str,
}

impl PanelNav {
    #[must_use]
    pub const fn new(area: Area, active: &'static str) -> Self {
        Self {
            base: area.base_path(),
            title: match area {
                Area::Admin => "Admin Panel",
                Area::Staff => "Staff Panel",
            },
            is_admin: matches!(area, Area::Admin),
            active,
        }
    }
}
