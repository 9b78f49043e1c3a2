//! Orders and the direct single-product checkout.
//!
//! A checkout always orders exactly one unit of one product, paid cash on
//! delivery. The product is copied into the order as a snapshot, so later
//! edits or deletion of the product never change existing orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{Email, OrderId, OrderStatus, Price, ProductId};

/// Flat gift-wrap surcharge in rupees.
pub const GIFT_WRAP_COST: i64 = 15;

/// Shown as the customer name when neither the address nor the profile has one.
pub const ANONYMOUS_CUSTOMER: &str = "Anonymous";

/// Shipping address as captured at checkout.
///
/// `local_area` is the panchayat or locality line of an Indian address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub full_name: String,
    pub house_name: String,
    pub city: String,
    pub state: String,
    pub local_area: String,
}

/// A line item snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
}

/// A stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub customer_email: Email,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub total: Price,
    pub items: Vec<OrderItem>,
    pub shipping_address: Address,
    pub phone: Option<String>,
    pub transaction_id: Option<String>,
    pub gift_wrap: bool,
    pub customer_notes: Option<String>,
}

impl Order {
    /// Whether any line item refers to the product.
    #[must_use]
    pub fn contains_product(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|item| item.product_id == product_id)
    }

    /// Total number of units across line items.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Checkout form values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CheckoutInput {
    pub full_name: String,
    pub house_name: String,
    pub city: String,
    pub state: String,
    pub local_area: String,
    pub phone: String,
    /// HTML checkboxes submit `on` when ticked and nothing otherwise.
    #[serde(default)]
    pub gift_wrap: Option<String>,
    #[serde(default)]
    pub customer_notes: Option<String>,
}

/// Why a checkout form was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckoutError {
    #[error("{0} is required")]
    MissingField(&'static str),
}

impl CheckoutInput {
    /// True when the gift-wrap box was ticked.
    #[must_use]
    pub fn wants_gift_wrap(&self) -> bool {
        self.gift_wrap
            .as_deref()
            .is_some_and(|v| matches!(v, "on" | "true" | "1"))
    }

    /// The trimmed address, phone and note.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MissingField`] for the first blank required field.
    pub fn validate(&self) -> Result<CheckoutDetails, CheckoutError> {
        let required = |value: &str, label: &'static str| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(CheckoutError::MissingField(label))
            } else {
                Ok(trimmed.to_owned())
            }
        };

        let address = Address {
            full_name: required(&self.full_name, "Full name")?,
            house_name: required(&self.house_name, "House name")?,
            city: required(&self.city, "City")?,
            state: required(&self.state, "State")?,
            local_area: required(&self.local_area, "Panchayat")?,
        };
        let phone = required(&self.phone, "Phone number")?;
        let customer_notes = self
            .customer_notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_owned);

        Ok(CheckoutDetails {
            address,
            phone,
            gift_wrap: self.wants_gift_wrap(),
            customer_notes,
        })
    }
}

/// A validated checkout form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDetails {
    pub address: Address,
    pub phone: String,
    pub gift_wrap: bool,
    pub customer_notes: Option<String>,
}

/// Order total for one unit of a product.
#[must_use]
pub fn order_total(unit_price: Price, gift_wrap: bool) -> Price {
    if gift_wrap {
        unit_price + Price::from_rupees(GIFT_WRAP_COST)
    } else {
        unit_price
    }
}

/// Name recorded on the order: address name, then display name, then a placeholder.
#[must_use]
pub fn customer_name(address: &Address, display_name: Option<&str>) -> String {
    [Some(address.full_name.as_str()), display_name]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .unwrap_or(ANONYMOUS_CUSTOMER)
        .to_owned()
}

/// An order about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_email: Email,
    pub status: OrderStatus,
    pub total: Price,
    pub items: Vec<OrderItem>,
    pub shipping_address: Address,
    pub phone: String,
    pub gift_wrap: bool,
    pub customer_notes: Option<String>,
}

impl NewOrder {
    /// Build the pending order for one unit of `product`.
    ///
    /// Stock is neither checked nor decremented.
    #[must_use]
    pub fn direct(
        product: &Product,
        customer_email: Email,
        display_name: Option<&str>,
        details: CheckoutDetails,
    ) -> Self {
        Self {
            customer_name: customer_name(&details.address, display_name),
            customer_email,
            status: OrderStatus::Pending,
            total: order_total(product.price, details.gift_wrap),
            items: vec![OrderItem {
                product_id: product.id,
                name: product.name.clone(),
                quantity: 1,
            }],
            shipping_address: details.address,
            phone: details.phone,
            gift_wrap: details.gift_wrap,
            customer_notes: details.customer_notes,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rose() -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new_random(),
            name: "Enchanted Rose".to_string(),
            description: "A rose in a glass dome.".to_string(),
            price: "79.99".parse().unwrap(),
            stock: 50,
            image_url: "https://picsum.photos/seed/rose/400/300".to_string(),
            category: "Magical Items".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn checkout_form() -> CheckoutInput {
        CheckoutInput {
            full_name: "Asha Menon".to_string(),
            house_name: "Rose Villa".to_string(),
            city: "Kochi".to_string(),
            state: "Kerala".to_string(),
            local_area: "Edappally".to_string(),
            phone: "9876543210".to_string(),
            gift_wrap: None,
            customer_notes: None,
        }
    }

    #[test]
    fn test_total_with_gift_wrap() {
        let total = order_total("79.99".parse().unwrap(), true);
        assert_eq!(total, "94.99".parse().unwrap());
        assert_eq!(total.to_string(), "₹94.99");
    }

    #[test]
    fn test_total_without_gift_wrap_is_price() {
        let price: Price = "79.99".parse().unwrap();
        assert_eq!(order_total(price, false), price);
    }

    #[test]
    fn test_direct_order_is_single_pending_unit() {
        let product = rose();
        let input = CheckoutInput {
            gift_wrap: Some("on".to_string()),
            customer_notes: Some("  Lovely gift!  ".to_string()),
            ..checkout_form()
        };
        let order = NewOrder::direct(
            &product,
            Email::parse("buyer@example.com").unwrap(),
            Some("Asha"),
            input.validate().unwrap(),
        );

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items.first().unwrap().quantity, 1);
        assert_eq!(order.items.first().unwrap().product_id, product.id);
        assert_eq!(order.total, "94.99".parse().unwrap());
        assert_eq!(order.customer_name, "Asha Menon");
        assert_eq!(order.customer_notes.as_deref(), Some("Lovely gift!"));
    }

    #[test]
    fn test_blank_required_field_rejected() {
        let input = CheckoutInput {
            city: "   ".to_string(),
            ..checkout_form()
        };
        assert_eq!(input.validate(), Err(CheckoutError::MissingField("City")));

        let no_phone = CheckoutInput {
            phone: String::new(),
            ..checkout_form()
        };
        assert!(no_phone.validate().is_err());
    }

    #[test]
    fn test_blank_note_dropped() {
        let input = CheckoutInput {
            customer_notes: Some("   ".to_string()),
            ..checkout_form()
        };
        assert_eq!(input.validate().unwrap().customer_notes, None);
    }

    #[test]
    fn test_customer_name_fallbacks() {
        let mut address = Address::default();
        assert_eq!(customer_name(&address, Some("Display")), "Display");
        assert_eq!(customer_name(&address, None), ANONYMOUS_CUSTOMER);
        assert_eq!(customer_name(&address, Some("  ")), ANONYMOUS_CUSTOMER);
        address.full_name = "Full Name".to_string();
        assert_eq!(customer_name(&address, Some("Display")), "Full Name");
    }

    #[test]
    fn test_gift_wrap_checkbox_values() {
        let ticked = CheckoutInput {
            gift_wrap: Some("on".to_string()),
            ..checkout_form()
        };
        assert!(ticked.wants_gift_wrap());
        assert!(!checkout_form().wants_gift_wrap());
    }
}
