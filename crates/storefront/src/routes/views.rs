//! Display models shared by several templates.
//!
//! Templates only print strings and test booleans; every formatting decision
//! is made here.

use chrono::{DateTime, SecondsFormat, Utc};

use mrshopy_core::catalog::Product;
use mrshopy_core::order::Order;

/// ISO-8601 timestamp for `<time datetime>` attributes.
#[must_use]
pub fn iso(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Human-readable date and time.
#[must_use]
pub fn human(dt: &DateTime<Utc>) -> String {
    dt.format("%d %b %Y, %H:%M").to_string()
}

/// Query string value, form-encoded.
#[must_use]
pub fn encode_query(key: &str, value: &str) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair(key, value)
        .finish()
}

#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock: i32,
    pub in_stock: bool,
    pub image_url: String,
    pub category: String,
    pub href: String,
}

impl From<&Product> for ProductView {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            description: p.description.clone(),
            price: p.price.to_string(),
            stock: p.stock,
            in_stock: p.stock > 0,
            image_url: p.image_url.clone(),
            category: p.category.clone(),
            href: format!("/shop/{}", p.id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub created_iso: String,
    pub created: String,
    pub status: &'static str,
    pub status_class: &'static str,
    pub total: String,
    pub items: Vec<OrderItemView>,
    pub unit_count: u32,
    pub transaction_id: Option<String>,
    pub gift_wrap: bool,
    pub customer_notes: Option<String>,
    pub phone: Option<String>,
    pub address_lines: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub name: String,
    pub quantity: u32,
    pub product_href: String,
}

impl From<&Order> for OrderView {
    fn from(o: &Order) -> Self {
        let a = &o.shipping_address;
        let address_lines = [
            &a.full_name,
            &a.house_name,
            &a.local_area,
            &a.city,
            &a.state,
        ]
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .cloned()
        .collect();

        Self {
            id: o.id.to_string(),
            customer_name: o.customer_name.clone(),
            customer_email: o.customer_email.to_string(),
            created_iso: iso(&o.created_at),
            created: human(&o.created_at),
            status: o.status.as_str(),
            status_class: o.status.badge_class(),
            total: o.total.to_string(),
            items: o
                .items
                .iter()
                .map(|item| OrderItemView {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    product_href: format!("/shop/{}", item.product_id),
                })
                .collect(),
            unit_count: o.unit_count(),
            transaction_id: o.transaction_id.clone(),
            gift_wrap: o.gift_wrap,
            customer_notes: o.customer_notes.clone(),
            phone: o.phone.clone(),
            address_lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_iso_is_utc_seconds() {
        let dt = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).single();
        assert_eq!(dt.map(|d| iso(&d)).as_deref(), Some("2026-03-01T09:30:00Z"));
    }

    #[test]
    fn test_encode_query() {
        assert_eq!(
            encode_query("category", "Magical Items"),
            "category=Magical+Items"
        );
    }
}
