//! Product management shared by the admin and staff panels.
//!
//! Every handler is generic over the panel's gate extractor, so the same code
//! serves `/admin/products/*` and `/staff/products/*` with the links, sidebar
//! and access rules of whichever panel mounted it.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{FromRequestParts, Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use mrshopy_core::ProductId;
use mrshopy_core::catalog::{ProductField, ProductInput, ProductValidationError, sample_products};
use mrshopy_core::roles::Area;

use super::layout::{PageChrome, PanelNav};
use super::views::ProductView;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{PanelGate, set_flash};
use crate::models::{CurrentUser, Flash};
use crate::services::CatalogService;
use crate::state::AppState;

/// Form input name of the image file.
const IMAGE_FIELD: &str = "image";

/// Request body limit for the product form: the image host accepts files up
/// to 10 MB, plus room for the text fields.
pub const MAX_PRODUCT_FORM_BYTES: usize = 11 * 1024 * 1024;

fn products_path(area: Area) -> String {
    format!("{}/products", area.base_path())
}

// =============================================================================
// Listing
// =============================================================================

pub struct ProductRow {
    pub product: ProductView,
    pub edit_href: String,
    pub delete_action: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "catalog/list.html")]
pub struct ProductListTemplate {
    pub chrome: PageChrome,
    pub nav: PanelNav,
    pub rows: Vec<ProductRow>,
    pub new_href: String,
    /// Only the super-admin may seed the sample catalog.
    pub seed_action: Option<String>,
}

#[instrument(skip_all, fields(area = ?G::AREA))]
pub async fn list<G>(gate: G, State(state): State<AppState>, session: Session) -> Result<Response>
where
    G: PanelGate + FromRequestParts<AppState>,
{
    let user = gate.into_user();
    let products = CatalogService::new(&state).list().await?;
    let base = products_path(G::AREA);

    let rows = products
        .iter()
        .map(|p| ProductRow {
            edit_href: format!("{base}/{}/edit", p.id),
            delete_action: format!("{base}/{}/delete", p.id),
            product: ProductView::from(p),
        })
        .collect();

    Ok(ProductListTemplate {
        chrome: PageChrome::load(&state, Some(&user), &session)
            .await
            .live("/live/products"),
        nav: PanelNav::new(G::AREA, "products"),
        rows,
        new_href: format!("{base}/new"),
        seed_action: matches!(G::AREA, Area::Admin).then(|| format!("{base}/seed")),
    }
    .into_response())
}

// =============================================================================
// Add / edit form
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "catalog/form.html")]
pub struct ProductFormTemplate {
    pub chrome: PageChrome,
    pub nav: PanelNav,
    pub heading: &'static str,
    pub submit_label: &'static str,
    pub action: String,
    pub cancel_href: String,
    pub form: ProductInput,
    pub upload_enabled: bool,
    pub form_error: Option<String>,
    pub name_error: Option<&'static str>,
    pub description_error: Option<&'static str>,
    pub price_error: Option<&'static str>,
    pub stock_error: Option<&'static str>,
    pub image_url_error: Option<&'static str>,
    pub category_error: Option<&'static str>,
}

/// Whether the form adds a product or edits an existing one.
#[derive(Debug, Clone, Copy)]
enum FormMode {
    Create,
    Edit(ProductId),
}

impl ProductFormTemplate {
    fn new(
        state: &AppState,
        chrome: PageChrome,
        area: Area,
        mode: FormMode,
        form: ProductInput,
    ) -> Self {
        let base = products_path(area);
        let (heading, submit_label, action) = match mode {
            FormMode::Create => ("Add Product", "Add Product", format!("{base}/new")),
            FormMode::Edit(id) => ("Edit Product", "Save Changes", format!("{base}/{id}")),
        };

        Self {
            chrome,
            nav: PanelNav::new(area, "products"),
            heading,
            submit_label,
            action,
            cancel_href: base,
            form,
            upload_enabled: state.images().is_some(),
            form_error: None,
            name_error: None,
            description_error: None,
            price_error: None,
            stock_error: None,
            image_url_error: None,
            category_error: None,
        }
    }

    fn with_errors(mut self, errors: &ProductValidationError) -> Self {
        self.name_error = errors.message_for(ProductField::Name);
        self.description_error = errors.message_for(ProductField::Description);
        self.price_error = errors.message_for(ProductField::Price);
        self.stock_error = errors.message_for(ProductField::Stock);
        self.image_url_error = errors.message_for(ProductField::ImageUrl);
        self.category_error = errors.message_for(ProductField::Category);
        self
    }
}

#[instrument(skip_all, fields(area = ?G::AREA))]
pub async fn new_form<G>(gate: G, State(state): State<AppState>, session: Session) -> Response
where
    G: PanelGate + FromRequestParts<AppState>,
{
    let user = gate.into_user();
    let chrome = PageChrome::load(&state, Some(&user), &session).await;
    ProductFormTemplate::new(&state, chrome, G::AREA, FormMode::Create, ProductInput::default())
        .into_response()
}

#[instrument(skip_all, fields(area = ?G::AREA, product_id = %id))]
pub async fn edit_form<G>(
    gate: G,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<Response>
where
    G: PanelGate + FromRequestParts<AppState>,
{
    let user = gate.into_user();
    let product = CatalogService::new(&state)
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let chrome = PageChrome::load(&state, Some(&user), &session).await;
    let form = ProductInput::from(&product);
    Ok(ProductFormTemplate::new(&state, chrome, G::AREA, FormMode::Edit(id), form).into_response())
}

// =============================================================================
// Submission
// =============================================================================

/// Image file attached to the product form.
struct UploadedImage {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// What was read from the product form before the body ended or failed.
struct SubmittedForm {
    input: ProductInput,
    image: Option<UploadedImage>,
    error: Option<MultipartError>,
}

/// Split the multipart body into text fields and the optional image.
///
/// The file input comes last in the form, so a body that breaks off inside
/// the image still yields the typed text fields.
async fn read_form(mut multipart: Multipart) -> SubmittedForm {
    let mut input = ProductInput::default();
    let mut image = None;

    let error = read_fields(&mut multipart, &mut input, &mut image).await.err();
    SubmittedForm {
        input,
        image,
        error,
    }
}

async fn read_fields(
    multipart: &mut Multipart,
    input: &mut ProductInput,
    image: &mut Option<UploadedImage>,
) -> std::result::Result<(), MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == IMAGE_FIELD {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field.bytes().await?;
            if !bytes.is_empty() {
                *image = Some(UploadedImage {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field.text().await?;
        match name.as_str() {
            "name" => input.name = value,
            "description" => input.description = value,
            "price" => input.price = value,
            "stock" => input.stock = value,
            "image_url" => input.image_url = value,
            "category" => input.category = value,
            _ => {}
        }
    }

    Ok(())
}

/// Validate a submission and apply it, re-rendering the form on bad input.
async fn submit(
    state: &AppState,
    user: &CurrentUser,
    session: &Session,
    area: Area,
    mode: FormMode,
    multipart: Multipart,
) -> Result<Response> {
    let SubmittedForm {
        mut input,
        image,
        error,
    } = read_form(multipart).await;

    if let Some(e) = error {
        if e.status() != StatusCode::PAYLOAD_TOO_LARGE {
            return Err(AppError::BadRequest(format!("invalid product form: {e}")));
        }
        tracing::warn!(error = %e, "Product form exceeded the upload limit");
        let chrome = PageChrome::load(state, Some(user), session).await;
        let mut page = ProductFormTemplate::new(state, chrome, area, mode, input);
        page.form_error = Some("Could not upload image.".to_string());
        return Ok(page.into_response());
    }

    // An uploaded file replaces whatever URL was typed in.
    if let (Some(image), Some(uploader)) = (image, state.images()) {
        match uploader
            .upload(&image.file_name, &image.content_type, image.bytes)
            .await
        {
            Ok(url) => input.image_url = url,
            Err(e) => {
                tracing::warn!(error = %e, "Image upload failed");
                let chrome = PageChrome::load(state, Some(user), session).await;
                let mut page = ProductFormTemplate::new(state, chrome, area, mode, input);
                page.form_error = Some("Could not upload image.".to_string());
                return Ok(page.into_response());
            }
        }
    }

    let draft = match input.validate() {
        Ok(draft) => draft,
        Err(errors) => {
            tracing::debug!(%errors, "Product form rejected");
            let chrome = PageChrome::load(state, Some(user), session).await;
            return Ok(ProductFormTemplate::new(state, chrome, area, mode, input)
                .with_errors(&errors)
                .into_response());
        }
    };

    let catalog = CatalogService::new(state);
    let base = products_path(area);
    let (result, done, failed, retry) = match mode {
        FormMode::Create => (
            catalog.create(&draft).await.map(|_| ()),
            "Product added.",
            "Could not add product.",
            format!("{base}/new"),
        ),
        FormMode::Edit(id) => (
            catalog.update(id, &draft).await.map(|_| ()),
            "Product updated.",
            "Could not update product.",
            format!("{base}/{id}/edit"),
        ),
    };

    match result {
        Ok(()) => {
            add_breadcrumb("catalog", done, Some(&[("name", draft.name.as_str())]));
            set_flash(session, Flash::success(done)).await;
            Ok(Redirect::to(&base).into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "Product write failed");
            set_flash(session, Flash::error(failed)).await;
            Ok(Redirect::to(&retry).into_response())
        }
    }
}

#[instrument(skip_all, fields(area = ?G::AREA))]
pub async fn create<G>(
    gate: G,
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Response>
where
    G: PanelGate + FromRequestParts<AppState>,
{
    let user = gate.into_user();
    submit(&state, &user, &session, G::AREA, FormMode::Create, multipart).await
}

#[instrument(skip_all, fields(area = ?G::AREA, product_id = %id))]
pub async fn update<G>(
    gate: G,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Response>
where
    G: PanelGate + FromRequestParts<AppState>,
{
    let user = gate.into_user();
    submit(&state, &user, &session, G::AREA, FormMode::Edit(id), multipart).await
}

#[instrument(skip_all, fields(area = ?G::AREA, product_id = %id))]
pub async fn delete<G>(
    _gate: G,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Redirect
where
    G: PanelGate + FromRequestParts<AppState>,
{
    match CatalogService::new(&state).delete(id).await {
        Ok(()) => set_flash(&session, Flash::success("Product deleted.")).await,
        Err(e) => {
            tracing::error!(error = %e, "Product delete failed");
            set_flash(&session, Flash::error("Could not delete product.")).await;
        }
    }
    Redirect::to(&products_path(G::AREA))
}

/// Add the sample products to the catalog.
#[instrument(skip_all)]
pub async fn seed<G>(_gate: G, State(state): State<AppState>, session: Session) -> Redirect
where
    G: PanelGate + FromRequestParts<AppState>,
{
    let flash = match CatalogService::new(&state).seed(&sample_products()).await {
        Ok(added) => Flash::success(format!("Added {added} sample products.")),
        Err(e) => {
            tracing::error!(error = %e, "Seeding failed");
            Flash::error("Could not seed products.")
        }
    };
    set_flash(&session, flash).await;
    Redirect::to(&products_path(G::AREA))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_products_path_per_area() {
        assert_eq!(products_path(Area::Admin), "/admin/products");
        assert_eq!(products_path(Area::Staff), "/staff/products");
    }

    #[test]
    fn test_field_errors_land_on_their_inputs() {
        let input = ProductInput {
            name: "ab".to_string(),
            description: "long enough text".to_string(),
            price: "-1".to_string(),
            stock: "12.5".to_string(),
            image_url: "https://example.com/a.png".to_string(),
            category: "Toys".to_string(),
        };
        let Err(errors) = input.validate() else {
            panic!("input should be rejected");
        };

        let page = ProductFormTemplate {
            chrome: PageChrome {
                site_name: "MRSHOPY".to_string(),
                logo_url: String::new(),
                banner: None,
                user: None,
                flash: None,
                live: None,
            },
            nav: PanelNav::new(Area::Staff, "products"),
            heading: "Add Product",
            submit_label: "Add Product",
            action: "/staff/products/new".to_string(),
            cancel_href: "/staff/products".to_string(),
            form: input,
            upload_enabled: false,
            form_error: None,
            name_error: None,
            description_error: None,
            price_error: None,
            stock_error: None,
            image_url_error: None,
            category_error: None,
        }
        .with_errors(&errors);

        assert_eq!(page.name_error, Some("Name must be at least 3 characters"));
        assert_eq!(page.price_error, Some("Price must be a positive number"));
        assert_eq!(page.stock_error, Some("Stock must be a positive integer"));
        assert_eq!(page.description_error, None);
        assert_eq!(page.category_error, None);
    }
}
