//! Markdown content pages (about, FAQ, policies).
//!
//! Pages are loaded from `<content_dir>/pages/*.md` once at startup. Each file
//! carries YAML front matter with at least a `title`; the file stem is the
//! page slug.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use serde::Deserialize;

/// Front matter of a content page.
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
}

/// A rendered page with metadata and HTML content.
#[derive(Debug, Clone)]
pub struct Page {
    pub slug: String,
    pub meta: PageMeta,
    pub content_html: String,
}

/// Content loading errors
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// All loaded pages, keyed by slug.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    pages: Arc<HashMap<String, Page>>,
}

impl ContentStore {
    /// Load every page under `content_dir/pages`.
    ///
    /// A missing directory yields an empty store; a page that fails to parse
    /// is logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Io` if the directory exists but cannot be read.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let dir = content_dir.join("pages");
        let mut pages = HashMap::new();

        if !dir.exists() {
            tracing::warn!("Pages directory does not exist: {:?}", dir);
            return Ok(Self::default());
        }

        let entries = std::fs::read_dir(&dir).map_err(|e| ContentError::Io(e.to_string()))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                match load_page(&path) {
                    Ok(page) => {
                        tracing::info!("Loaded page: {}", page.slug);
                        pages.insert(page.slug.clone(), page);
                    }
                    Err(e) => {
                        tracing::error!("Failed to load page {:?}: {}", path, e);
                    }
                }
            }
        }

        Ok(Self {
            pages: Arc::new(pages),
        })
    }

    /// Build a store from already-parsed pages.
    #[must_use]
    pub fn from_pages(pages: impl IntoIterator<Item = Page>) -> Self {
        Self {
            pages: Arc::new(pages.into_iter().map(|p| (p.slug.clone(), p)).collect()),
        }
    }

    /// Get a page by slug
    #[must_use]
    pub fn get_page(&self, slug: &str) -> Option<&Page> {
        self.pages.get(slug)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

fn load_page(path: &Path) -> Result<Page, ContentError> {
    let content = std::fs::read_to_string(path).map_err(|e| ContentError::Io(e.to_string()))?;

    let slug = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ContentError::Parse("Invalid filename".to_string()))?;

    parse_page(slug, &content)
}

/// Parse front matter and render the body of one page.
///
/// # Errors
///
/// Returns `ContentError::Parse` if the front matter is missing or malformed.
pub fn parse_page(slug: &str, source: &str) -> Result<Page, ContentError> {
    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<PageMeta> = matter
        .parse(source)
        .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))?;
    let meta = parsed
        .data
        .ok_or_else(|| ContentError::Parse("Missing frontmatter".to_string()))?;

    Ok(Page {
        slug: slug.to_string(),
        meta,
        content_html: render_markdown(&parsed.content),
    })
}

/// Render markdown to HTML with GitHub Flavored Markdown support.
fn render_markdown(content: &str) -> String {
    let mut options = Options::default();

    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.header_ids = Some(String::new());

    // Content is authored in-repo, so raw HTML (contact links, line breaks) is allowed.
    options.render.r#unsafe = true;

    markdown_to_html(content, &options)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const FAQ: &str = "---\ntitle: Frequently Asked Questions\ndescription: Answers\nupdated_at: 2026-01-15\n---\n\n## How do I pay?\n\nCash on delivery.\n";

    #[test]
    fn test_parse_page_reads_front_matter() {
        let page = parse_page("faq", FAQ).unwrap();
        assert_eq!(page.slug, "faq");
        assert_eq!(page.meta.title, "Frequently Asked Questions");
        assert_eq!(page.meta.description.as_deref(), Some("Answers"));
        assert_eq!(
            page.meta.updated_at,
            Some(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap())
        );
        assert!(page.content_html.contains("<h2"));
        assert!(page.content_html.contains("Cash on delivery."));
    }

    #[test]
    fn test_missing_front_matter_is_an_error() {
        assert!(matches!(
            parse_page("bare", "# Just markdown\n"),
            Err(ContentError::Parse(_))
        ));
    }

    #[test]
    fn test_store_lookup() {
        let store = ContentStore::from_pages([parse_page("faq", FAQ).unwrap()]);
        assert_eq!(store.len(), 1);
        assert!(store.get_page("faq").is_some());
        assert!(store.get_page("about").is_none());
    }

    #[test]
    fn test_missing_directory_loads_empty() {
        let store = ContentStore::load(Path::new("/nonexistent/mrshopy-content")).unwrap();
        assert!(store.is_empty());
    }
}
