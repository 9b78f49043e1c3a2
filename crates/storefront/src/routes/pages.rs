//! Static content pages (about, FAQ, policies).
//!
//! Markdown lives in `content/pages/{slug}.md` and is rendered once at
//! start-up; each slug below is served at `/{slug}`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, extract::State, routing::get};
use chrono::NaiveDate;
use tower_sessions::Session;
use tracing::instrument;

use super::layout::PageChrome;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Slugs with a page route, in footer order.
pub const PAGE_SLUGS: &[&str] = &[
    "about",
    "faq",
    "contact-us",
    "shipping-policy",
    "payment-policy",
    "privacy-policy",
    "return-refund-policy",
    "terms-and-conditions",
    "disclaimer",
];

/// Content page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/content.html")]
pub struct ContentPageTemplate {
    pub chrome: PageChrome,
    pub title: String,
    pub description: String,
    pub updated_at: Option<NaiveDate>,
    pub content_html: String,
}

/// Serve a content page by slug.
///
/// # Errors
///
/// Returns 404 if no markdown file was loaded for the slug.
#[instrument(skip(state, user, session))]
pub async fn show(
    state: &AppState,
    slug: &str,
    user: Option<CurrentUser>,
    session: &Session,
) -> Result<ContentPageTemplate> {
    let page = state
        .content()
        .get_page(slug)
        .ok_or_else(|| AppError::NotFound(format!("page {slug}")))?;

    Ok(ContentPageTemplate {
        chrome: PageChrome::load(state, user.as_ref(), session).await,
        title: page.meta.title.clone(),
        description: page.meta.description.clone().unwrap_or_default(),
        updated_at: page.meta.updated_at,
        content_html: page.content_html.clone(),
    })
}

/// Create the pages routes router.
pub fn router() -> Router<AppState> {
    PAGE_SLUGS.iter().fold(Router::new(), |router, &slug| {
        router.route(
            &format!("/{slug}"),
            get(
                move |State(state): State<AppState>,
                      OptionalAuth(user): OptionalAuth,
                      session: Session| async move {
                    show(&state, slug, user, &session).await
                },
            ),
        )
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::content::ContentStore;

    #[test]
    fn test_every_routed_page_has_content() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("content");
        let store = ContentStore::load(&dir).unwrap();

        for slug in PAGE_SLUGS {
            let page = store.get_page(slug);
            assert!(page.is_some(), "missing content/pages/{slug}.md");
            assert!(!page.unwrap().meta.title.is_empty());
        }
    }
}
