//! Google OAuth sign-in routes.
//!
//! - Login: stores a random state in the session and redirects to Google
//! - Callback: checks the state, exchanges the code, upserts the profile

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rand::Rng;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use mrshopy_core::Email;

use super::auth::complete_sign_in;
use crate::models::session::keys;
use crate::services::auth::AuthService;
use crate::services::live::Collection;
use crate::state::AppState;

/// Query parameters from the Google callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Generate a random alphanumeric string.
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .filter_map(|_| CHARSET.get(rng.random_range(0..CHARSET.len())))
        .map(|&b| char::from(b))
        .collect()
}

fn fail(code: &str) -> Response {
    Redirect::to(&format!("/login?error={code}")).into_response()
}

/// `GET /auth/google/login`
pub async fn login(State(state): State<AppState>, session: Session) -> Response {
    let Some(google) = state.google() else {
        return fail("google_unavailable");
    };

    let oauth_state = generate_random_string(32);
    if let Err(e) = session.insert(keys::GOOGLE_OAUTH_STATE, &oauth_state).await {
        tracing::error!("Failed to store OAuth state in session: {}", e);
        return fail("session");
    }

    Redirect::to(&google.authorization_url(&oauth_state)).into_response()
}

/// `GET /auth/google/callback`
#[instrument(skip(state, session, query))]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let Some(google) = state.google() else {
        return fail("google_unavailable");
    };

    if let Some(error) = query.error {
        tracing::warn!("Google OAuth error: {}", error);
        return fail("google_denied");
    }

    let stored_state: Option<String> = session
        .remove(keys::GOOGLE_OAUTH_STATE)
        .await
        .ok()
        .flatten();
    if stored_state.is_none() || stored_state != query.state {
        tracing::warn!("Google OAuth state mismatch");
        return fail("invalid_state");
    }

    let Some(code) = query.code else {
        tracing::warn!("Google OAuth callback missing code");
        return fail("google_failed");
    };

    let identity = match google.exchange_code(&code).await {
        Ok(token) => google.user_info(&token).await,
        Err(e) => Err(e),
    };
    let identity = match identity {
        Ok(identity) => identity,
        Err(e) => {
            tracing::error!(error = %e, "Google sign-in failed");
            return fail("google_failed");
        }
    };

    let Ok(email) = Email::parse(&identity.email) else {
        tracing::warn!("Google returned an unusable email");
        return fail("google_failed");
    };

    match AuthService::new(state.pool())
        .sign_in_federated(&email, identity.name.as_deref(), identity.picture.as_deref())
        .await
    {
        Ok(profile) => {
            state.revalidate(Collection::Profiles).await;
            complete_sign_in(&session, &profile).await
        }
        Err(e) => {
            tracing::error!(error = %e, "Profile upsert failed");
            fail("google_failed")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_string_shape() {
        let s = generate_random_string(32);
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(s, generate_random_string(32));
    }
}
