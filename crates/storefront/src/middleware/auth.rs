//! Authentication and role-gate extractors.
//!
//! The principal is read from the session on every request and its role is
//! resolved from the compiled-in allowlists, so changing an allowlist takes
//! effect without signing anyone out.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use mrshopy_core::roles::{self, Area, GATE_REDIRECT};

use crate::models::CurrentUser;
use crate::models::session::keys;

/// Where unauthenticated customers are sent.
pub const LOGIN_PATH: &str = "/login";

/// Extractor that requires a signed-in user.
///
/// If nobody is signed in, redirects to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn account(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.display_name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but nobody is signed in.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for event streams).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

async fn current_user(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentUser>(keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts).await.map(Self).ok_or_else(|| {
            if parts.uri.path().starts_with("/live/") {
                AuthRejection::Unauthorized
            } else {
                AuthRejection::RedirectToLogin
            }
        })
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is signed in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(parts).await))
    }
}

/// Rejection for a principal outside an area's allowlist.
pub struct GateRejection;

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        Redirect::to(GATE_REDIRECT).into_response()
    }
}

async fn gate(parts: &Parts, area: Area) -> Result<CurrentUser, GateRejection> {
    match current_user(parts).await {
        Some(user) if roles::may_enter(area, Some(&user.email)) => Ok(user),
        other => {
            tracing::info!(
                ?area,
                path = %parts.uri.path(),
                signed_in = other.is_some(),
                "Role gate redirected request"
            );
            Err(GateRejection)
        }
    }
}

/// Extractor that admits only the super-admin; everyone else goes to `/shop`.
pub struct RequireSuperAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireSuperAdmin
where
    S: Send + Sync,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        gate(parts, Area::Admin).await.map(Self)
    }
}

/// Extractor that admits only staff members; everyone else goes to `/shop`.
pub struct RequireStaff(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        gate(parts, Area::Staff).await.map(Self)
    }
}

/// A gate extractor for one of the panels, with the area it guards.
///
/// Lets a single handler serve both `/admin/products` and `/staff/products`.
pub trait PanelGate: Send {
    const AREA: Area;

    fn into_user(self) -> CurrentUser;
}

impl PanelGate for RequireSuperAdmin {
    const AREA: Area = Area::Admin;

    fn into_user(self) -> CurrentUser {
        self.0
    }
}

impl PanelGate for RequireStaff {
    const AREA: Area = Area::Staff;

    fn into_user(self) -> CurrentUser {
        self.0
    }
}

/// Helper to set the current user in the session.
///
/// Cycles the session id first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::CURRENT_USER, user).await
}

/// Helper to clear the session on logout.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
