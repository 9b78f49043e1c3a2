//! Integration tests for MRSHOPY.
//!
//! These run against a live server and database and are `#[ignore]`d by
//! default.
//!
//! # Running Tests
//!
//! ```bash
//! mrshopy-cli migrate && mrshopy-cli seed
//! cargo run -p mrshopy-storefront &
//! cargo test -p mrshopy-integration-tests -- --ignored
//! ```
//!
//! `SHOP_BASE_URL` overrides the default `http://localhost:3000`. Tests that
//! act as the super-admin sign in as `admin1@gmail.com` with
//! `SHOP_ADMIN_PASSWORD`, registering the account on first use.

use reqwest::{Client, redirect::Policy};

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("SHOP_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned())
}

/// A client with its own cookie jar that reports redirects instead of
/// following them.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn client() -> reqwest::Result<Client> {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
}

/// A fresh address that no existing profile uses.
#[must_use]
pub fn unique_email() -> String {
    format!("it-{}@example.com", uuid::Uuid::new_v4().simple())
}

/// Register a customer account; the session cookie lands in `client`.
///
/// Returns the `Location` the server redirected to.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn register(client: &Client, email: &str, password: &str) -> reqwest::Result<String> {
    let resp = client
        .post(format!("{}/register", base_url()))
        .form(&[
            ("display_name", "Integration Test"),
            ("email", email),
            ("password", password),
            ("password_confirm", password),
        ])
        .send()
        .await?;
    Ok(location(&resp))
}

/// The `Location` header of a redirect, or an empty string.
#[must_use]
pub fn location(resp: &reqwest::Response) -> String {
    resp.headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

/// Sign `client` in as the super-admin, registering the account if it does
/// not exist yet.
///
/// Returns the `Location` of the final redirect (`/admin/dashboard` on
/// success).
///
/// # Errors
///
/// Returns an error if a request fails.
pub async fn sign_in_super_admin(client: &Client) -> reqwest::Result<String> {
    let email = "admin1@gmail.com";
    let password =
        std::env::var("SHOP_ADMIN_PASSWORD").unwrap_or_else(|_| "integration-admin-pw".to_owned());

    let resp = client
        .post(format!("{}/login", base_url()))
        .form(&[("email", email), ("password", password.as_str())])
        .send()
        .await?;
    let landing = location(&resp);
    if !landing.is_empty() {
        return Ok(landing);
    }
    register(client, email, &password).await
}

/// GET `path` and return the page body.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn page(client: &Client, path: &str) -> reqwest::Result<String> {
    client
        .get(format!("{}{path}", base_url()))
        .send()
        .await?
        .text()
        .await
}

/// The text between the first `start` and the following `end`.
#[must_use]
pub fn text_between<'a>(html: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = html.find(start)? + start.len();
    let len = html[from..].find(end)?;
    Some(&html[from..from + len])
}
