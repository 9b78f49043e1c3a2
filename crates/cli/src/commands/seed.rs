//! Catalog seeding command.
//!
//! Without `--file` the four built-in sample products are added. With a
//! file, products are read from YAML:
//!
//! ```yaml
//! products:
//!   - name: Travel Mug
//!     description: Keeps coffee hot for six hours on the road.
//!     price: 24.50
//!     stock: 40
//!     image_url: https://images.example.com/mug.jpg
//!     category: Kitchen
//! ```
//!
//! Every entry goes through the same validation as the product form; one bad
//! entry aborts the whole seed. Running servers are told to drop their cached
//! catalog once the insert commits.

use std::path::Path;

use serde::Deserialize;

use mrshopy_core::catalog::{ProductDraft, ProductInput, sample_products};
use mrshopy_storefront::db::ProductRepository;
use mrshopy_storefront::services::live::{Collection, notify_change};

use super::{CommandError, connect};

#[derive(Debug, Deserialize)]
struct SeedFile {
    products: Vec<SeedProduct>,
}

/// A YAML product entry; numbers may be written bare or quoted.
#[derive(Debug, Deserialize)]
struct SeedProduct {
    name: String,
    #[serde(default)]
    description: String,
    price: serde_yaml::Value,
    stock: serde_yaml::Value,
    #[serde(default)]
    image_url: String,
    #[serde(default)]
    category: String,
}

fn scalar_text(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

impl From<SeedProduct> for ProductInput {
    fn from(p: SeedProduct) -> Self {
        Self {
            price: scalar_text(&p.price),
            stock: scalar_text(&p.stock),
            name: p.name,
            description: p.description,
            image_url: p.image_url,
            category: p.category,
        }
    }
}

/// Parse and validate a YAML seed document.
fn parse_seed(yaml: &str) -> Result<Vec<ProductDraft>, CommandError> {
    let file: SeedFile = serde_yaml::from_str(yaml)?;

    let mut drafts = Vec::with_capacity(file.products.len());
    let mut invalid = 0;
    for (index, product) in file.products.into_iter().enumerate() {
        let name = product.name.clone();
        match ProductInput::from(product).validate() {
            Ok(draft) => drafts.push(draft),
            Err(e) => {
                tracing::error!(index, name = %name, "Invalid product: {e}");
                invalid += 1;
            }
        }
    }

    if invalid > 0 {
        return Err(CommandError::InvalidProducts(invalid));
    }
    Ok(drafts)
}

/// Seed the catalog.
///
/// # Errors
///
/// Returns an error if the file cannot be read or validated, or the insert
/// fails.
pub async fn run(file: Option<&Path>) -> Result<(), CommandError> {
    let drafts = match file {
        Some(path) => {
            tracing::info!(path = %path.display(), "Reading seed file");
            let yaml =
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| CommandError::ReadFile {
                        path: path.display().to_string(),
                        source,
                    })?;
            parse_seed(&yaml)?
        }
        None => sample_products(),
    };

    let pool = connect().await?;
    let inserted = ProductRepository::new(&pool).create_many(&drafts).await?;

    if let Err(e) = notify_change(&pool, Collection::Products).await {
        tracing::warn!(error = %e, "Could not notify running servers; catalog caches expire within 5 minutes");
    }

    tracing::info!(inserted, "Seeding complete!");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed_accepts_bare_and_quoted_numbers() {
        let yaml = r#"
products:
  - name: Travel Mug
    description: Keeps coffee hot for six hours on the road.
    price: 24.50
    stock: 40
    image_url: https://images.example.com/mug.jpg
    category: Kitchen
  - name: Desk Lamp
    description: Warm light with a dimmer and a weighted base.
    price: "39.99"
    stock: "12"
    image_url: https://images.example.com/lamp.jpg
    category: Home
"#;
        let drafts = parse_seed(yaml).unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].stock, 40);
        assert_eq!(drafts[1].name, "Desk Lamp");
    }

    #[test]
    fn test_parse_seed_rejects_invalid_entries() {
        let yaml = r"
products:
  - name: X
    price: -1
    stock: many
";
        let err = parse_seed(yaml).unwrap_err();
        assert!(matches!(err, CommandError::InvalidProducts(1)));
    }

    #[test]
    fn test_parse_seed_rejects_malformed_yaml() {
        assert!(matches!(
            parse_seed("products: 3"),
            Err(CommandError::Yaml(_))
        ));
    }
}
