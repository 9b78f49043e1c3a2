//! Order fulfilment: list, detail, transaction id, completion.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use mrshopy_core::OrderId;
use mrshopy_core::roles::Area;

use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireSuperAdmin, set_flash};
use crate::models::Flash;
use crate::routes::layout::{PageChrome, PanelNav};
use crate::routes::views::OrderView;
use crate::services::OrderService;
use crate::state::AppState;

const ORDERS_PATH: &str = "/admin/orders";

#[derive(Template, WebTemplate)]
#[template(path = "admin/orders.html")]
pub struct OrdersTemplate {
    pub chrome: PageChrome,
    pub nav: PanelNav,
    pub orders: Vec<OrderView>,
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/order_detail.html")]
pub struct OrderDetailTemplate {
    pub chrome: PageChrome,
    pub nav: PanelNav,
    pub order: OrderView,
    pub transaction_action: String,
    pub complete_action: String,
}

#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    #[serde(default)]
    pub transaction_id: String,
}

#[instrument(skip_all)]
pub async fn list(
    RequireSuperAdmin(user): RequireSuperAdmin,
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse> {
    let orders = OrderService::new(&state).list_all().await?;

    Ok(OrdersTemplate {
        chrome: PageChrome::load(&state, Some(&user), &session)
            .await
            .live("/live/orders"),
        nav: PanelNav::new(Area::Admin, "orders"),
        orders: orders.iter().map(OrderView::from).collect(),
    })
}

#[instrument(skip(user, state, session))]
pub async fn show(
    RequireSuperAdmin(user): RequireSuperAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<OrderId>,
) -> Result<impl IntoResponse> {
    let order = OrderService::new(&state)
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    Ok(OrderDetailTemplate {
        chrome: PageChrome::load(&state, Some(&user), &session).await,
        nav: PanelNav::new(Area::Admin, "orders"),
        order: OrderView::from(&order),
        transaction_action: format!("{ORDERS_PATH}/{id}/transaction"),
        complete_action: format!("{ORDERS_PATH}/{id}/complete"),
    })
}

#[instrument(skip(_admin, state, session, form))]
pub async fn set_transaction(
    _admin: RequireSuperAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<OrderId>,
    Form(form): Form<TransactionForm>,
) -> Redirect {
    match OrderService::new(&state)
        .set_transaction_id(id, &form.transaction_id)
        .await
    {
        Ok(()) => {
            set_flash(&session, Flash::success("Transaction ID saved.")).await;
            Redirect::to(&format!("{ORDERS_PATH}/{id}"))
        }
        Err(RepositoryError::NotFound) => {
            set_flash(&session, Flash::error("That order no longer exists.")).await;
            Redirect::to(ORDERS_PATH)
        }
        Err(e) => {
            tracing::error!(error = %e, "Saving transaction id failed");
            set_flash(&session, Flash::error("Could not save transaction ID.")).await;
            Redirect::to(&format!("{ORDERS_PATH}/{id}"))
        }
    }
}

/// Completing an order removes it from every list.
#[instrument(skip(_admin, state, session))]
pub async fn complete(
    _admin: RequireSuperAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<OrderId>,
) -> Redirect {
    match OrderService::new(&state).complete(id).await {
        Ok(()) => {
            set_flash(&session, Flash::success("Order completed.")).await;
            Redirect::to(ORDERS_PATH)
        }
        Err(RepositoryError::NotFound) => {
            set_flash(&session, Flash::error("That order no longer exists.")).await;
            Redirect::to(ORDERS_PATH)
        }
        Err(e) => {
            tracing::error!(error = %e, "Completing order failed");
            set_flash(&session, Flash::error("Could not complete order.")).await;
            Redirect::to(&format!("{ORDERS_PATH}/{id}"))
        }
    }
}
