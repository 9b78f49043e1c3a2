//! Product catalog: records, form validation and storefront filtering.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// A product as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock: i32,
    pub image_url: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw product form values as submitted by an admin or staff member.
///
/// Every field is kept as text so validation can report all problems at once
/// instead of failing at the first unparsable number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock: String,
    pub image_url: String,
    pub category: String,
}

/// A validated product, ready to be inserted or written over an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock: i32,
    pub image_url: String,
    pub category: String,
}

/// Form field a validation message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductField {
    Name,
    Description,
    Price,
    Stock,
    ImageUrl,
    Category,
}

impl ProductField {
    /// Form input name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Price => "price",
            Self::Stock => "stock",
            Self::ImageUrl => "image_url",
            Self::Category => "category",
        }
    }
}

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: ProductField,
    pub message: &'static str,
}

/// All field-level failures for one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductValidationError {
    pub errors: Vec<FieldError>,
}

impl fmt::Display for ProductValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message).collect();
        write!(f, "invalid product: {}", messages.join("; "))
    }
}

impl std::error::Error for ProductValidationError {}

impl ProductValidationError {
    /// Message for a given field, if that field failed.
    #[must_use]
    pub fn message_for(&self, field: ProductField) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message)
    }

    fn push(&mut self, field: ProductField, message: &'static str) {
        self.errors.push(FieldError { field, message });
    }
}

pub const MIN_NAME_LENGTH: usize = 3;
pub const MIN_DESCRIPTION_LENGTH: usize = 10;

impl ProductInput {
    /// Validate the raw form values.
    ///
    /// # Errors
    ///
    /// Returns every failing field with its user-facing message.
    pub fn validate(&self) -> Result<ProductDraft, ProductValidationError> {
        let mut errors = ProductValidationError::default();

        let name = self.name.trim();
        if name.chars().count() < MIN_NAME_LENGTH {
            errors.push(ProductField::Name, "Name must be at least 3 characters");
        }

        let description = self.description.trim();
        if description.chars().count() < MIN_DESCRIPTION_LENGTH {
            errors.push(
                ProductField::Description,
                "Description must be at least 10 characters",
            );
        }

        let price = match self.price.parse::<Price>() {
            Ok(price) if price.is_negative() => {
                errors.push(ProductField::Price, "Price must be a positive number");
                None
            }
            Ok(price) if !price.is_storable() => {
                errors.push(
                    ProductField::Price,
                    "Price must have at most 2 decimal places and be below 10000000000",
                );
                None
            }
            Ok(price) => Some(price),
            Err(_) => {
                errors.push(ProductField::Price, "Price must be a positive number");
                None
            }
        };

        let stock = parse_stock(&self.stock);
        if stock.is_none() {
            errors.push(ProductField::Stock, "Stock must be a positive integer");
        }

        let image_url = self.image_url.trim();
        if !is_http_url(image_url) {
            errors.push(ProductField::ImageUrl, "Must be a valid URL");
        }

        let category = self.category.trim();
        if category.is_empty() {
            errors.push(ProductField::Category, "Category is required");
        }

        match (price, stock) {
            (Some(price), Some(stock)) if errors.errors.is_empty() => Ok(ProductDraft {
                name: name.to_owned(),
                description: description.to_owned(),
                price,
                stock,
                image_url: image_url.to_owned(),
                category: category.to_owned(),
            }),
            _ => Err(errors),
        }
    }
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.amount().to_string(),
            stock: product.stock.to_string(),
            image_url: product.image_url.clone(),
            category: product.category.clone(),
        }
    }
}

impl From<&ProductDraft> for ProductInput {
    fn from(draft: &ProductDraft) -> Self {
        Self {
            name: draft.name.clone(),
            description: draft.description.clone(),
            price: draft.price.amount().to_string(),
            stock: draft.stock.to_string(),
            image_url: draft.image_url.clone(),
            category: draft.category.clone(),
        }
    }
}

/// Whole, non-negative stock counts. `12.0` is accepted, `12.5` is not.
fn parse_stock(raw: &str) -> Option<i32> {
    let value: Decimal = raw.trim().parse().ok()?;
    if value.is_sign_negative() && !value.is_zero() {
        return None;
    }
    if !value.fract().is_zero() {
        return None;
    }
    value.trunc().to_i32()
}

fn is_http_url(raw: &str) -> bool {
    url::Url::parse(raw)
        .is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
}

/// Storefront listing filters taken from the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogFilter {
    /// Free-text search over name and description.
    pub q: Option<String>,
    /// Exact category label.
    pub category: Option<String>,
}

impl CatalogFilter {
    /// The trimmed search term, if any.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    /// The selected category, if any.
    #[must_use]
    pub fn selected_category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Whether a product passes both filters.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let category_ok = self
            .selected_category()
            .is_none_or(|category| product.category == category);

        let query_ok = self.query().is_none_or(|q| {
            let needle = q.to_lowercase();
            product.name.to_lowercase().contains(&needle)
                || product.description.to_lowercase().contains(&needle)
        });

        category_ok && query_ok
    }

    /// Apply the filters, keeping the input order.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Distinct category labels, sorted.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .map(|p| p.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The sample catalog used by the "seed products" action and the CLI.
#[must_use]
pub fn sample_products() -> Vec<ProductDraft> {
    let sample = |name: &str, description: &str, price: &str, stock: i32, category: &str, seed: &str| {
        ProductDraft {
            name: name.to_owned(),
            description: description.to_owned(),
            price: price.parse().unwrap_or(Price::ZERO),
            stock,
            image_url: format!("https://picsum.photos/seed/{seed}/400/300"),
            category: category.to_owned(),
        }
    };

    vec![
        sample(
            "Enchanted Rose",
            "A single, perfect rose encased in a glass dome, that magically never wilts. Comes with a soft, warm light.",
            "79.99",
            50,
            "Magical Items",
            "rose",
        ),
        sample(
            "Goblin-crafted Silver Locket",
            "A beautiful silver locket known for its intricate design and resistance to tarnishing. It is said to bring good luck.",
            "129.99",
            30,
            "Jewelry",
            "locket",
        ),
        sample(
            "Phoenix Feather Quill",
            "A quill made from a phoenix feather. It writes in flames and the ink never runs out.",
            "99.99",
            20,
            "Stationery",
            "quill",
        ),
        sample(
            "Dragon Scale Armor Polish",
            "Keep your dragon scale armor shiny and in top condition with this exclusive polish. Also works on regular leather.",
            "25.50",
            100,
            "Adventuring Gear",
            "polish",
        ),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_input() -> ProductInput {
        ProductInput {
            name: "Enchanted Rose".to_string(),
            description: "A rose in a glass dome that never wilts.".to_string(),
            price: "79.99".to_string(),
            stock: "50".to_string(),
            image_url: "https://picsum.photos/seed/rose/400/300".to_string(),
            category: "Magical Items".to_string(),
        }
    }

    fn product(name: &str, description: &str, category: &str) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new_random(),
            name: name.to_string(),
            description: description.to_string(),
            price: Price::from_rupees(10),
            stock: 1,
            image_url: "https://example.com/a.png".to_string(),
            category: category.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_valid_input_produces_draft() {
        let draft = valid_input().validate().unwrap();
        assert_eq!(draft.name, "Enchanted Rose");
        assert_eq!(draft.price, "79.99".parse().unwrap());
        assert_eq!(draft.stock, 50);
    }

    #[test]
    fn test_negative_price_rejected() {
        let input = ProductInput {
            price: "-1".to_string(),
            ..valid_input()
        };
        let err = input.validate().unwrap_err();
        assert_eq!(
            err.message_for(ProductField::Price),
            Some("Price must be a positive number")
        );
    }

    #[test]
    fn test_sub_paise_price_rejected() {
        let input = ProductInput {
            price: "10.999".to_string(),
            ..valid_input()
        };
        let err = input.validate().unwrap_err();
        assert_eq!(
            err.message_for(ProductField::Price),
            Some("Price must have at most 2 decimal places and be below 10000000000")
        );

        let padded = ProductInput {
            price: "10.500".to_string(),
            ..valid_input()
        };
        assert_eq!(padded.validate().unwrap().price, "10.5".parse().unwrap());
    }

    #[test]
    fn test_price_beyond_column_range_rejected() {
        let input = ProductInput {
            price: "12345678901".to_string(),
            ..valid_input()
        };
        assert!(input.validate().unwrap_err().message_for(ProductField::Price).is_some());

        let largest = ProductInput {
            price: "9999999999.99".to_string(),
            ..valid_input()
        };
        assert!(largest.validate().is_ok());
    }

    #[test]
    fn test_zero_price_and_stock_accepted() {
        let input = ProductInput {
            price: "0".to_string(),
            stock: "0".to_string(),
            ..valid_input()
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_negative_stock_rejected() {
        let input = ProductInput {
            stock: "-3".to_string(),
            ..valid_input()
        };
        let err = input.validate().unwrap_err();
        assert_eq!(
            err.message_for(ProductField::Stock),
            Some("Stock must be a positive integer")
        );
    }

    #[test]
    fn test_fractional_stock_rejected() {
        let input = ProductInput {
            stock: "12.5".to_string(),
            ..valid_input()
        };
        assert!(input.validate().is_err());

        let whole = ProductInput {
            stock: "12.0".to_string(),
            ..valid_input()
        };
        assert_eq!(whole.validate().unwrap().stock, 12);
    }

    #[test]
    fn test_short_description_rejected() {
        let input = ProductInput {
            description: "too short".to_string(),
            ..valid_input()
        };
        let err = input.validate().unwrap_err();
        assert_eq!(
            err.message_for(ProductField::Description),
            Some("Description must be at least 10 characters")
        );
    }

    #[test]
    fn test_all_errors_reported_together() {
        let input = ProductInput {
            name: "ab".to_string(),
            description: String::new(),
            price: "abc".to_string(),
            stock: "x".to_string(),
            image_url: "not a url".to_string(),
            category: "  ".to_string(),
        };
        let err = input.validate().unwrap_err();
        assert_eq!(err.errors.len(), 6);
        assert_eq!(
            err.message_for(ProductField::Category),
            Some("Category is required")
        );
        assert_eq!(
            err.message_for(ProductField::ImageUrl),
            Some("Must be a valid URL")
        );
    }

    #[test]
    fn test_non_http_url_rejected() {
        let input = ProductInput {
            image_url: "ftp://example.com/a.png".to_string(),
            ..valid_input()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_filter_by_query_is_case_insensitive_over_name_and_description() {
        let products = vec![
            product("Silver Locket", "Shiny jewelry", "Jewelry"),
            product("Quill", "Writes in FLAMES", "Stationery"),
            product("Polish", "For armor", "Gear"),
        ];

        let by_name = CatalogFilter {
            q: Some("locket".to_string()),
            category: None,
        };
        assert_eq!(by_name.apply(&products).len(), 1);

        let by_description = CatalogFilter {
            q: Some("flames".to_string()),
            category: None,
        };
        let found = by_description.apply(&products);
        assert_eq!(found.len(), 1);
        assert_eq!(found.first().unwrap().name, "Quill");
    }

    #[test]
    fn test_filter_by_category_and_blank_query() {
        let products = vec![
            product("Silver Locket", "Shiny jewelry", "Jewelry"),
            product("Gold Ring", "Shiny jewelry", "Jewelry"),
            product("Quill", "Writes", "Stationery"),
        ];
        let filter = CatalogFilter {
            q: Some("   ".to_string()),
            category: Some("Jewelry".to_string()),
        };
        assert_eq!(filter.apply(&products).len(), 2);
    }

    #[test]
    fn test_categories_are_distinct_and_sorted() {
        let products = vec![
            product("a", "d", "Stationery"),
            product("b", "d", "Jewelry"),
            product("c", "d", "Stationery"),
        ];
        assert_eq!(categories(&products), vec!["Jewelry", "Stationery"]);
    }

    #[test]
    fn test_sample_products_are_valid() {
        for draft in sample_products() {
            assert!(ProductInput::from(&draft).validate().is_ok(), "{}", draft.name);
        }
    }
}
