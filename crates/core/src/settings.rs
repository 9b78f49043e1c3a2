//! Site-wide singleton settings and the user profile record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::order::Address;
use crate::types::{Email, UserId};

pub const DEFAULT_SITE_NAME: &str = "MRSHOPY";
pub const DEFAULT_LOGO_URL: &str =
    "https://res.cloudinary.com/ddqzzqnjh/image/upload/v1767286657/hbn0rm8hof8mre3zu0dk.png";

/// Storage key of the site identity document.
pub const SITE_INFO_KEY: &str = "siteInfo";
/// Storage key of the promotional banner document.
pub const PROMO_BANNER_KEY: &str = "promoBanner";

/// Shop name and logo shown in every header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub name: String,
    pub logo_url: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_SITE_NAME.to_owned(),
            logo_url: DEFAULT_LOGO_URL.to_owned(),
        }
    }
}

impl SiteSettings {
    /// Logo to render; a blank URL falls back to the stock logo.
    #[must_use]
    pub fn logo(&self) -> &str {
        let url = self.logo_url.trim();
        if url.is_empty() { DEFAULT_LOGO_URL } else { url }
    }
}

/// Promotional strip above the storefront header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerSettings {
    pub text: String,
    pub enabled: bool,
}

impl BannerSettings {
    /// Text to render, when the banner is switched on and not blank.
    #[must_use]
    pub fn visible_text(&self) -> Option<&str> {
        let text = self.text.trim();
        (self.enabled && !text.is_empty()).then_some(text)
    }
}

/// A signed-in user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: Email,
    pub display_name: String,
    pub photo_url: Option<String>,
    /// Address used on the last order, offered again at the next checkout.
    pub shipping_address: Option<Address>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Checkout prefill: the remembered address, or just the display name.
    #[must_use]
    pub fn checkout_prefill(&self) -> Address {
        self.shipping_address.clone().unwrap_or_else(|| Address {
            full_name: self.display_name.clone(),
            ..Address::default()
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_site_defaults() {
        let site = SiteSettings::default();
        assert_eq!(site.name, "MRSHOPY");
        assert!(site.logo_url.starts_with("https://"));
    }

    #[test]
    fn test_blank_logo_falls_back() {
        let site = SiteSettings {
            name: "Shop".to_string(),
            logo_url: " ".to_string(),
        };
        assert_eq!(site.logo(), DEFAULT_LOGO_URL);
    }

    #[test]
    fn test_site_settings_json_uses_camel_case() {
        let json = serde_json::to_value(SiteSettings::default()).unwrap();
        assert!(json.get("logoUrl").is_some());
    }

    #[test]
    fn test_banner_visibility() {
        let mut banner = BannerSettings::default();
        assert_eq!(banner.visible_text(), None);

        banner.text = " Free gift wrap this week ".to_string();
        assert_eq!(banner.visible_text(), None);

        banner.enabled = true;
        assert_eq!(banner.visible_text(), Some("Free gift wrap this week"));

        banner.text = "   ".to_string();
        assert_eq!(banner.visible_text(), None);
    }

    #[test]
    fn test_checkout_prefill() {
        let now = Utc::now();
        let mut profile = UserProfile {
            id: UserId::new_random(),
            email: Email::parse("buyer@example.com").unwrap(),
            display_name: "Asha".to_string(),
            photo_url: None,
            shipping_address: None,
            phone: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(profile.checkout_prefill().full_name, "Asha");
        assert!(profile.checkout_prefill().city.is_empty());

        profile.shipping_address = Some(Address {
            full_name: "Asha Menon".to_string(),
            city: "Kochi".to_string(),
            ..Address::default()
        });
        assert_eq!(profile.checkout_prefill().city, "Kochi");
    }
}
