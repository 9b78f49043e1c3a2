//! Admin dashboard: headline figures and the newest orders.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
};
use tower_sessions::Session;
use tracing::instrument;

use mrshopy_core::reports::{RECENT_ORDER_COUNT, dashboard_stats, recent_orders};
use mrshopy_core::roles::Area;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireSuperAdmin;
use crate::routes::layout::{PageChrome, PanelNav};
use crate::routes::views::OrderView;
use crate::services::{CatalogService, OrderService};
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub chrome: PageChrome,
    pub nav: PanelNav,
    pub revenue: String,
    pub pending_orders: usize,
    pub customers: usize,
    pub products: usize,
    pub recent: Vec<OrderView>,
}

/// `/admin` lands on the dashboard.
pub async fn index(RequireSuperAdmin(_): RequireSuperAdmin) -> Redirect {
    Redirect::to("/admin/dashboard")
}

#[instrument(skip_all)]
pub async fn show(
    RequireSuperAdmin(user): RequireSuperAdmin,
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse> {
    let orders = OrderService::new(&state).list_all().await?;
    let products = CatalogService::new(&state).list().await?;
    let stats = dashboard_stats(&orders, products.len());

    Ok(DashboardTemplate {
        chrome: PageChrome::load(&state, Some(&user), &session)
            .await
            .live("/live/orders"),
        nav: PanelNav::new(Area::Admin, "dashboard"),
        revenue: stats.revenue.to_string(),
        pending_orders: stats.pending_orders,
        customers: stats.customers,
        products: stats.products,
        recent: recent_orders(&orders, RECENT_ORDER_COUNT)
            .into_iter()
            .map(OrderView::from)
            .collect(),
    })
}
