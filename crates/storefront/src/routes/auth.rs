//! Email/password sign-in, registration and sign-out.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use mrshopy_core::settings::UserProfile;
use mrshopy_core::{Email, Role};

use super::layout::PageChrome;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub display_name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// `?error=` codes set by redirects into the sign-in page.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

/// Message for an `?error=` code.
fn error_message(code: &str) -> &'static str {
    match code {
        "google_denied" => "Google sign-in was cancelled.",
        "google_failed" => "Could not sign you in with Google. Please try again.",
        "google_unavailable" => "Google sign-in is not available.",
        "invalid_state" | "session" => "Your sign-in session expired. Please try again.",
        _ => "Sign-in failed. Please try again.",
    }
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub chrome: PageChrome,
    pub email: String,
    pub error: Option<String>,
    pub google_enabled: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub chrome: PageChrome,
    pub display_name: String,
    pub email: String,
    pub error: Option<String>,
    pub google_enabled: bool,
}

/// Landing page after sign-in for each role.
#[must_use]
pub fn landing_path(email: &Email) -> &'static str {
    match mrshopy_core::roles::role_for(email) {
        Role::SuperAdmin => "/admin/dashboard",
        Role::Staff => "/staff/products",
        Role::Customer => "/shop",
    }
}

/// Store the principal in the session and send them to their landing page.
pub(crate) async fn complete_sign_in(session: &Session, profile: &UserProfile) -> Response {
    let user = CurrentUser::from(profile);
    if let Err(e) = set_current_user(session, &user).await {
        tracing::error!("Failed to set session: {}", e);
        return Redirect::to("/login?error=session").into_response();
    }
    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, role = %user.role(), "Signed in");
    Redirect::to(landing_path(&user.email)).into_response()
}

// =============================================================================
// Login
// =============================================================================

pub async fn login_page(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Query(query): Query<MessageQuery>,
) -> Response {
    if let Some(user) = user {
        return Redirect::to(landing_path(&user.email)).into_response();
    }

    LoginTemplate {
        chrome: PageChrome::load(&state, None, &session).await,
        email: String::new(),
        error: query.error.as_deref().map(|c| error_message(c).to_string()),
        google_enabled: state.google().is_some(),
    }
    .into_response()
}

#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    match AuthService::new(state.pool())
        .login_with_password(&form.email, &form.password)
        .await
    {
        Ok(profile) => complete_sign_in(&session, &profile).await,
        Err(e) => {
            if matches!(e, AuthError::Repository(_) | AuthError::PasswordHash) {
                tracing::error!(error = %e, "Login failed");
            } else {
                tracing::warn!(error = %e, "Login rejected");
            }
            LoginTemplate {
                chrome: PageChrome::load(&state, None, &session).await,
                email: form.email,
                error: Some(e.user_message()),
                google_enabled: state.google().is_some(),
            }
            .into_response()
        }
    }
}

// =============================================================================
// Registration
// =============================================================================

pub async fn register_page(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Response {
    if let Some(user) = user {
        return Redirect::to(landing_path(&user.email)).into_response();
    }

    RegisterTemplate {
        chrome: PageChrome::load(&state, None, &session).await,
        display_name: String::new(),
        email: String::new(),
        error: None,
        google_enabled: state.google().is_some(),
    }
    .into_response()
}

#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    let result = if form.password == form.password_confirm {
        AuthService::new(state.pool())
            .register_with_password(&form.email, &form.display_name, &form.password)
            .await
    } else {
        Err(AuthError::WeakPassword("Passwords do not match.".to_string()))
    };

    match result {
        Ok(profile) => {
            tracing::info!(user_id = %profile.id, "Account registered");
            state
                .revalidate(crate::services::live::Collection::Profiles)
                .await;
            complete_sign_in(&session, &profile).await
        }
        Err(e) => {
            tracing::warn!(error = %e, "Registration rejected");
            RegisterTemplate {
                chrome: PageChrome::load(&state, None, &session).await,
                display_name: form.display_name,
                email: form.email,
                error: Some(e.user_message()),
                google_enabled: state.google().is_some(),
            }
            .into_response()
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_current_user(&session).await {
        tracing::warn!(error = %e, "Failed to clear session on logout");
    }
    clear_sentry_user();
    Redirect::to("/shop")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_path_by_role() {
        assert_eq!(
            landing_path(&Email::parse("admin1@gmail.com").unwrap()),
            "/admin/dashboard"
        );
        assert_eq!(
            landing_path(&Email::parse("staff1@gmail.com").unwrap()),
            "/staff/products"
        );
        assert_eq!(
            landing_path(&Email::parse("buyer@example.com").unwrap()),
            "/shop"
        );
    }

    #[test]
    fn test_error_codes_have_messages() {
        assert_eq!(
            error_message("google_denied"),
            "Google sign-in was cancelled."
        );
        assert_eq!(error_message("anything"), "Sign-in failed. Please try again.");
    }
}
