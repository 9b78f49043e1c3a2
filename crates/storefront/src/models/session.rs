//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use mrshopy_core::settings::UserProfile;
use mrshopy_core::{Email, Role, UserId, roles};

/// Session-stored user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub display_name: String,
    pub photo_url: Option<String>,
}

impl CurrentUser {
    /// Role resolved from the allowlists on every call.
    #[must_use]
    pub fn role(&self) -> Role {
        roles::role_for(&self.email)
    }
}

impl From<&UserProfile> for CurrentUser {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.id,
            email: profile.email.clone(),
            display_name: profile.display_name.clone(),
            photo_url: profile.photo_url.clone(),
        }
    }
}

/// Kind of a one-shot notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashKind {
    Success,
    Error,
}

/// A notice carried across a redirect and shown once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.kind, FlashKind::Error)
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for Google OAuth state (CSRF protection).
    pub const GOOGLE_OAUTH_STATE: &str = "google_oauth_state";

    /// One-shot notice shown on the next rendered page.
    pub const FLASH: &str = "flash";
}
