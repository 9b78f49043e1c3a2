//! Google OAuth 2.0 sign-in client.
//!
//! # OAuth Flow
//!
//! 1. Generate a random state and store it in the session
//! 2. Redirect to [`GoogleClient::authorization_url`]
//! 3. Google redirects back with `code` and `state`
//! 4. Exchange the code with [`GoogleClient::exchange_code`]
//! 5. Fetch the verified identity with [`GoogleClient::user_info`]

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::GoogleOAuthConfig;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Errors from the Google sign-in flow.
#[derive(Debug, Error)]
pub enum GoogleAuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("Google account email is not verified")]
    UnverifiedEmail,

    #[error("invalid email from Google: {0}")]
    InvalidEmail(#[from] mrshopy_core::EmailError),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Identity claims returned by the userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleUser {
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Client for Google's OAuth endpoints.
#[derive(Clone)]
pub struct GoogleClient {
    inner: Arc<GoogleClientInner>,
}

struct GoogleClientInner {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl GoogleClient {
    /// Create a client whose callback is `{base_url}/auth/google/callback`.
    #[must_use]
    pub fn new(config: &GoogleOAuthConfig, base_url: &str) -> Self {
        Self {
            inner: Arc::new(GoogleClientInner {
                client: reqwest::Client::new(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.expose_secret().to_string(),
                redirect_uri: format!("{base_url}/auth/google/callback"),
            }),
        }
    }

    /// Authorization URL to redirect the browser to.
    #[must_use]
    pub fn authorization_url(&self, state: &str) -> String {
        let params = [
            ("client_id", self.inner.client_id.as_str()),
            ("redirect_uri", self.inner.redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", "openid email profile"),
            ("state", state),
            ("prompt", "select_account"),
        ];
        Url::parse_with_params(AUTHORIZE_URL, &params)
            .map(String::from)
            .unwrap_or_else(|_| AUTHORIZE_URL.to_string())
    }

    /// Exchange an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// Returns `GoogleAuthError::TokenExchange` if Google rejects the code.
    pub async fn exchange_code(&self, code: &str) -> Result<String, GoogleAuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.inner.client_id.as_str()),
            ("client_secret", self.inner.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.inner.redirect_uri.as_str()),
        ];

        let response = self
            .inner
            .client
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GoogleAuthError::TokenExchange(text));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Fetch the signed-in account's identity.
    ///
    /// # Errors
    ///
    /// Returns `GoogleAuthError::UnverifiedEmail` if Google has not verified the email.
    pub async fn user_info(&self, access_token: &str) -> Result<GoogleUser, GoogleAuthError> {
        let user: GoogleUser = self
            .inner
            .client
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !user.email_verified {
            return Err(GoogleAuthError::UnverifiedEmail);
        }
        Ok(user)
    }
}
