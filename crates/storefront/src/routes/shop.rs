//! Storefront: catalog listing, product page, direct checkout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use mrshopy_core::catalog::{self, CatalogFilter, Product};
use mrshopy_core::order::{Address, CheckoutInput, GIFT_WRAP_COST, order_total};
use mrshopy_core::reviews::reviews_for;
use mrshopy_core::{Price, ProductId};

use super::layout::PageChrome;
use super::views::{ProductView, encode_query, human, iso};
use crate::db::UserRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth, set_flash};
use crate::models::{CurrentUser, Flash};
use crate::services::orders::PlaceOrderError;
use crate::services::{CatalogService, OrderService};
use crate::state::AppState;

// =============================================================================
// Listing
// =============================================================================

pub struct CategoryLink {
    pub name: String,
    pub href: String,
    pub selected: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "shop/index.html")]
pub struct ShopIndexTemplate {
    pub chrome: PageChrome,
    pub products: Vec<ProductView>,
    pub categories: Vec<CategoryLink>,
    pub all_selected: bool,
    pub query: String,
    pub heading: String,
}

/// `/` sends visitors to the shop.
pub async fn home() -> Redirect {
    Redirect::to("/shop")
}

#[instrument(skip(state, user, session))]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Query(filter): Query<CatalogFilter>,
) -> Result<impl IntoResponse> {
    let products = CatalogService::new(&state).list().await?;
    let selected = filter.selected_category();

    let categories = catalog::categories(&products)
        .into_iter()
        .map(|name| CategoryLink {
            href: format!("/shop?{}", encode_query("category", &name)),
            selected: selected == Some(name.as_str()),
            name,
        })
        .collect();

    let heading = selected.map_or_else(|| "All products".to_string(), str::to_string);

    Ok(ShopIndexTemplate {
        chrome: PageChrome::load(&state, user.as_ref(), &session)
            .await
            .live("/live/products"),
        products: filter.apply(&products).into_iter().map(ProductView::from).collect(),
        categories,
        all_selected: selected.is_none(),
        query: filter.query().unwrap_or_default().to_string(),
        heading,
    })
}

// =============================================================================
// Product page
// =============================================================================

pub struct ReviewView {
    pub customer_name: String,
    pub initials: String,
    pub note: String,
    pub created_iso: String,
    pub created: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "shop/product.html")]
pub struct ProductTemplate {
    pub chrome: PageChrome,
    pub product: ProductView,
    pub reviews: Vec<ReviewView>,
    pub order_href: String,
}

async fn load_product(state: &AppState, id: ProductId) -> Result<Product> {
    CatalogService::new(state)
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

#[instrument(skip(state, user, session))]
pub async fn product(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = load_product(&state, id).await?;
    let orders = OrderService::new(&state).list_all().await?;

    let reviews = reviews_for(id, &orders)
        .into_iter()
        .map(|r| ReviewView {
            customer_name: r.customer_name,
            initials: r.initials,
            note: r.note,
            created_iso: iso(&r.created_at),
            created: human(&r.created_at),
        })
        .collect();

    Ok(ProductTemplate {
        chrome: PageChrome::load(&state, user.as_ref(), &session).await,
        order_href: format!("/shop/{id}/order"),
        product: ProductView::from(&product),
        reviews,
    })
}

// =============================================================================
// Checkout
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "shop/checkout.html")]
pub struct CheckoutTemplate {
    pub chrome: PageChrome,
    pub product: ProductView,
    pub form: CheckoutInput,
    pub gift_wrap_checked: bool,
    pub gift_wrap_cost: String,
    pub total: String,
    pub total_with_wrap: String,
    pub action: String,
    pub error: Option<String>,
}

impl CheckoutTemplate {
    fn new(chrome: PageChrome, product: &Product, form: CheckoutInput) -> Self {
        Self {
            chrome,
            gift_wrap_checked: form.wants_gift_wrap(),
            form,
            gift_wrap_cost: Price::from_rupees(GIFT_WRAP_COST).to_string(),
            total: order_total(product.price, false).to_string(),
            total_with_wrap: order_total(product.price, true).to_string(),
            action: format!("/shop/{}/order", product.id),
            product: ProductView::from(product),
            error: None,
        }
    }
}

/// Checkout form prefilled from the profile's remembered address.
async fn prefill(state: &AppState, user: &CurrentUser) -> Result<CheckoutInput> {
    let profile = UserRepository::new(state.pool())
        .get_by_email(&user.email)
        .await?;

    let (address, phone) = profile.map_or_else(
        || {
            (
                Address {
                    full_name: user.display_name.clone(),
                    ..Default::default()
                },
                None,
            )
        },
        |p| (p.checkout_prefill(), p.phone),
    );

    Ok(CheckoutInput {
        full_name: address.full_name,
        house_name: address.house_name,
        city: address.city,
        state: address.state,
        local_area: address.local_area,
        phone: phone.unwrap_or_default(),
        gift_wrap: None,
        customer_notes: None,
    })
}

#[instrument(skip(state, user, session), fields(email = %user.email))]
pub async fn checkout_page(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = load_product(&state, id).await?;
    let form = prefill(&state, &user).await?;
    let chrome = PageChrome::load(&state, Some(&user), &session).await;
    Ok(CheckoutTemplate::new(chrome, &product, form))
}

#[instrument(skip(state, user, session, form), fields(email = %user.email))]
pub async fn place_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Path(id): Path<ProductId>,
    Form(form): Form<CheckoutInput>,
) -> Result<Response> {
    match OrderService::new(&state).place(id, &user, &form).await {
        Ok(order) => {
            let order_id = order.id.to_string();
            add_breadcrumb("checkout", "Order placed", Some(&[("order_id", order_id.as_str())]));
            set_flash(
                &session,
                Flash::success("Order placed! We will contact you to confirm delivery."),
            )
            .await;
            Ok(Redirect::to("/account").into_response())
        }
        Err(PlaceOrderError::Invalid(e)) => {
            let product = load_product(&state, id).await?;
            let chrome = PageChrome::load(&state, Some(&user), &session).await;
            let mut page = CheckoutTemplate::new(chrome, &product, form);
            page.error = Some(e.to_string());
            Ok(page.into_response())
        }
        Err(PlaceOrderError::ProductNotFound) => Err(AppError::NotFound(format!("product {id}"))),
        Err(PlaceOrderError::Repository(e)) => {
            tracing::error!(error = %e, "Order insert failed");
            set_flash(&session, Flash::error("Could not place order. Please try again.")).await;
            Ok(Redirect::to(&format!("/shop/{id}/order")).into_response())
        }
    }
}
