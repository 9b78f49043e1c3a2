//! Account page: profile card and order history.
//!
//! Requires a signed-in user.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use super::layout::PageChrome;
use super::views::OrderView;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::services::OrderService;
use crate::state::AppState;

/// Account overview page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountTemplate {
    pub chrome: PageChrome,
    pub display_name: String,
    pub email: String,
    pub photo_url: Option<String>,
    pub orders: Vec<OrderView>,
}

/// Profile card and the customer's orders, newest first.
#[instrument(skip(state, user, session), fields(email = %user.email))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
) -> Result<impl IntoResponse> {
    let orders = OrderService::new(&state)
        .list_for_customer(&user.email)
        .await?;

    Ok(AccountTemplate {
        chrome: PageChrome::load(&state, Some(&user), &session)
            .await
            .live("/live/account/orders"),
        display_name: user.display_name.clone(),
        email: user.email.to_string(),
        photo_url: user.photo_url.clone(),
        orders: orders.iter().map(OrderView::from).collect(),
    })
}
