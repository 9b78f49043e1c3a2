//! Product reviews derived from order notes.
//!
//! There is no review entity. A "review" is the free-text note a customer
//! left when ordering the product.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::order::Order;
use crate::types::ProductId;

/// Most reviews shown on a product page.
pub const MAX_REVIEWS: usize = 10;

/// A note left on an order for the product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    pub customer_name: String,
    pub initials: String,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

/// Up to [`MAX_REVIEWS`] notes for the product, newest first.
///
/// Scans every order; orders without a non-blank note are skipped.
#[must_use]
pub fn reviews_for(product_id: ProductId, orders: &[Order]) -> Vec<Review> {
    let mut matching: Vec<&Order> = orders
        .iter()
        .filter(|order| order.contains_product(product_id))
        .filter(|order| {
            order
                .customer_notes
                .as_deref()
                .is_some_and(|note| !note.trim().is_empty())
        })
        .collect();

    matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    matching
        .into_iter()
        .take(MAX_REVIEWS)
        .map(|order| Review {
            customer_name: order.customer_name.clone(),
            initials: initials(&order.customer_name),
            note: order
                .customer_notes
                .as_deref()
                .unwrap_or_default()
                .trim()
                .to_owned(),
            created_at: order.created_at,
        })
        .collect()
}

/// Up to two uppercase initials for an avatar, `?` when the name is blank.
#[must_use]
pub fn initials(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect();

    if letters.is_empty() {
        "?".to_owned()
    } else {
        letters
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::order::{Address, OrderItem};
    use crate::types::{Email, OrderId, OrderStatus, Price};

    fn order(product_id: ProductId, minutes_ago: i64, note: Option<&str>) -> Order {
        Order {
            id: OrderId::new_random(),
            customer_name: format!("Customer {minutes_ago}"),
            customer_email: Email::parse("buyer@example.com").unwrap(),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
            status: OrderStatus::Pending,
            total: Price::from_rupees(10),
            items: vec![OrderItem {
                product_id,
                name: "Thing".to_string(),
                quantity: 1,
            }],
            shipping_address: Address::default(),
            phone: None,
            transaction_id: None,
            gift_wrap: false,
            customer_notes: note.map(str::to_string),
        }
    }

    #[test]
    fn test_only_orders_for_product_with_notes() {
        let product = ProductId::new_random();
        let other = ProductId::new_random();
        let orders = vec![
            order(product, 1, Some("Great!")),
            order(product, 2, None),
            order(product, 3, Some("   ")),
            order(other, 4, Some("Other product")),
        ];

        let reviews = reviews_for(product, &orders);
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews.first().unwrap().note, "Great!");
    }

    #[test]
    fn test_newest_first_and_capped() {
        let product = ProductId::new_random();
        let orders: Vec<Order> = (0..15)
            .rev()
            .map(|i| order(product, i, Some("note")))
            .collect();

        let reviews = reviews_for(product, &orders);
        assert_eq!(reviews.len(), MAX_REVIEWS);
        assert_eq!(reviews.first().unwrap().customer_name, "Customer 0");
        assert!(
            reviews
                .windows(2)
                .all(|w| w.first().unwrap().created_at >= w.last().unwrap().created_at)
        );
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("asha menon"), "AM");
        assert_eq!(initials("Cher"), "C");
        assert_eq!(initials("a b c"), "AB");
        assert_eq!(initials("  "), "?");
    }
}
