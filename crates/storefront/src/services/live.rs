//! Change notifications for live views.
//!
//! Every mutation publishes the [`Collection`] it touched. SSE handlers
//! subscribe, re-query the whole collection on each notification and push the
//! fresh snapshot; nothing is diffed.
//!
//! Writes made outside the server process (the CLI seeder) arrive over the
//! Postgres `NOTIFY` channel [`CHANGE_CHANNEL`] and are revalidated the same
//! way as in-process writes.

use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;
use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tokio::sync::broadcast;

use crate::state::AppState;

/// Notifications buffered per subscriber before it is considered lagging.
const CHANNEL_CAPACITY: usize = 64;

/// Postgres channel carrying changes made by other processes.
pub const CHANGE_CHANNEL: &str = "mrshopy_changes";

/// A collection whose contents changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Products,
    Orders,
    Settings,
    Profiles,
}

impl Collection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Orders => "orders",
            Self::Settings => "settings",
            Self::Profiles => "profiles",
        }
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "products" => Ok(Self::Products),
            "orders" => Ok(Self::Orders),
            "settings" => Ok(Self::Settings),
            "profiles" => Ok(Self::Profiles),
            other => Err(format!("unknown collection: {other}")),
        }
    }
}

/// Tell running servers that `collection` changed underneath them.
///
/// # Errors
///
/// Returns `sqlx::Error` if the notification cannot be sent.
pub async fn notify_change(pool: &PgPool, collection: Collection) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_notify($1, $2)")
        .bind(CHANGE_CHANNEL)
        .bind(collection.as_str())
        .execute(pool)
        .await?;
    Ok(())
}

/// Revalidate on every change announced by another process.
///
/// Runs for the life of the server. Connection failures are logged and
/// retried.
pub async fn listen_for_changes(state: AppState) {
    loop {
        if let Err(e) = forward_notifications(&state).await {
            tracing::warn!(error = %e, "Change listener failed; retrying");
        }
        tokio::time::sleep(Duration::from_secs(5)).await;
    }
}

async fn forward_notifications(state: &AppState) -> Result<(), sqlx::Error> {
    let mut listener = PgListener::connect_with(state.pool()).await?;
    listener.listen(CHANGE_CHANNEL).await?;
    tracing::info!(channel = CHANGE_CHANNEL, "Listening for external changes");

    loop {
        let notification = listener.recv().await?;
        match notification.payload().parse::<Collection>() {
            Ok(collection) => {
                tracing::info!(?collection, "External change received");
                state.revalidate(collection).await;
            }
            Err(e) => tracing::warn!(error = %e, "Ignoring change notification"),
        }
    }
}

/// Process-wide broadcast of collection changes.
#[derive(Clone)]
pub struct LiveFeed {
    tx: broadcast::Sender<Collection>,
}

impl Default for LiveFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveFeed {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Announce a change. Having no subscribers is not an error.
    pub fn publish(&self, collection: Collection) {
        let receivers = self.tx.send(collection).unwrap_or(0);
        tracing::debug!(?collection, receivers, "Published change");
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Collection> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_changes() {
        let feed = LiveFeed::new();
        let mut rx = feed.subscribe();

        feed.publish(Collection::Orders);
        feed.publish(Collection::Products);

        assert_eq!(rx.recv().await.unwrap(), Collection::Orders);
        assert_eq!(rx.recv().await.unwrap(), Collection::Products);
    }

    #[test]
    fn test_notification_payload_names_collection() {
        assert_eq!(
            Collection::Products.as_str().parse::<Collection>().unwrap(),
            Collection::Products
        );
        assert_eq!(
            serde_json::to_value(Collection::Settings).unwrap(),
            Collection::Settings.as_str()
        );
        assert!("carts".parse::<Collection>().is_err());
    }

    #[test]
    fn test_publish_without_subscribers() {
        LiveFeed::new().publish(Collection::Settings);
    }
}
