//! Customers as seen through their orders.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use mrshopy_core::reports::customer_summaries;
use mrshopy_core::roles::Area;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireSuperAdmin;
use crate::routes::layout::{PageChrome, PanelNav};
use crate::routes::views::{human, iso};
use crate::services::OrderService;
use crate::state::AppState;

pub struct CustomerRow {
    pub name: String,
    pub email: String,
    pub order_count: usize,
    pub last_order_iso: String,
    pub last_order: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/users.html")]
pub struct UsersTemplate {
    pub chrome: PageChrome,
    pub nav: PanelNav,
    pub customers: Vec<CustomerRow>,
}

#[instrument(skip_all)]
pub async fn list(
    RequireSuperAdmin(user): RequireSuperAdmin,
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse> {
    let orders = OrderService::new(&state).list_all().await?;
    let customers = customer_summaries(&orders)
        .into_iter()
        .map(|c| CustomerRow {
            name: c.name,
            email: c.email.to_string(),
            order_count: c.order_count,
            last_order_iso: iso(&c.last_order),
            last_order: human(&c.last_order),
        })
        .collect();

    Ok(UsersTemplate {
        chrome: PageChrome::load(&state, Some(&user), &session)
            .await
            .live("/live/orders"),
        nav: PanelNav::new(Area::Admin, "users"),
        customers,
    })
}
