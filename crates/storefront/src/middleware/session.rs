//! Session middleware configuration and flash notices.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions.

use sqlx::PgPool;
use tower_sessions::{Expiry, Session, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::ShopConfig;
use crate::models::Flash;
use crate::models::session::keys;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "mrshopy_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store.
///
/// The session table is created by `mrshopy-cli migrate`.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &ShopConfig,
) -> SessionManagerLayer<PostgresStore> {
    configure_layer(PostgresStore::new(pool.clone()), config)
}

/// Apply cookie settings to a layer over any store.
pub fn configure_layer<S: SessionStore + Clone>(
    store: S,
    config: &ShopConfig,
) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_https())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Queue a notice for the next rendered page.
pub async fn set_flash(session: &Session, flash: Flash) {
    if let Err(e) = session.insert(keys::FLASH, flash).await {
        tracing::warn!(error = %e, "Could not store flash notice");
    }
}

/// Take the pending notice, if any.
pub async fn take_flash(session: &Session) -> Option<Flash> {
    session.remove::<Flash>(keys::FLASH).await.ok().flatten()
}
