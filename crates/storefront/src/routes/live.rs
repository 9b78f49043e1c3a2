//! Server-sent event streams that keep open pages current.
//!
//! Each stream sends a `snapshot` event with the whole collection as JSON on
//! connect and again after every change to that collection. `static/live.js`
//! reloads the page on any snapshot after the first.

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use tokio::sync::broadcast::error::RecvError;

use mrshopy_core::Email;

use crate::error::AppError;
use crate::middleware::{RequireAuth, RequireSuperAdmin};
use crate::services::live::Collection;
use crate::services::{CatalogService, OrderService};
use crate::state::AppState;

/// What a stream publishes.
#[derive(Debug, Clone)]
enum Feed {
    Products,
    AllOrders,
    CustomerOrders(Email),
}

impl Feed {
    const fn watches(&self) -> Collection {
        match self {
            Self::Products => Collection::Products,
            Self::AllOrders | Self::CustomerOrders(_) => Collection::Orders,
        }
    }

    async fn snapshot(&self, state: &AppState) -> Result<Event, AppError> {
        let event = Event::default().event("snapshot");
        let event = match self {
            Self::Products => {
                let products = CatalogService::new(state).list().await?;
                event.json_data(products.as_slice())
            }
            Self::AllOrders => event.json_data(OrderService::new(state).list_all().await?),
            Self::CustomerOrders(email) => {
                event.json_data(OrderService::new(state).list_for_customer(email).await?)
            }
        };
        event.map_err(|e| AppError::Internal(format!("snapshot encoding failed: {e}")))
    }
}

/// Snapshot now, then again whenever the watched collection changes.
fn snapshots(state: AppState, feed: Feed) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut changes = state.live().subscribe();
    let watched = feed.watches();

    let stream = async_stream::stream! {
        'feed: loop {
            match feed.snapshot(&state).await {
                Ok(event) => yield Ok(event),
                Err(e) => tracing::warn!(error = %e, ?feed, "Live snapshot failed"),
            }

            loop {
                match changes.recv().await {
                    Ok(changed) if changed == watched => break,
                    Ok(_) => {}
                    Err(RecvError::Lagged(missed)) => {
                        tracing::debug!(missed, "Live subscriber lagged, resending snapshot");
                        break;
                    }
                    Err(RecvError::Closed) => break 'feed,
                }
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// `GET /live/products`
pub async fn products(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    snapshots(state, Feed::Products)
}

/// `GET /live/orders` (super-admin)
pub async fn orders(
    _admin: RequireSuperAdmin,
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    snapshots(state, Feed::AllOrders)
}

/// `GET /live/account/orders`
pub async fn account_orders(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    snapshots(state, Feed::CustomerOrders(user.email))
}
