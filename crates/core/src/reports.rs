//! Admin dashboard figures and the customer list, computed from orders.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::order::Order;
use crate::types::{Email, OrderStatus, Price};

/// Orders listed under "recent orders".
pub const RECENT_ORDER_COUNT: usize = 5;

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// Sum of totals over `Delivered` orders only.
    pub revenue: Price,
    /// Number of `Pending` orders.
    pub pending_orders: usize,
    /// Distinct customer emails across all orders.
    pub customers: usize,
    pub products: usize,
}

/// Compute dashboard figures.
#[must_use]
pub fn dashboard_stats(orders: &[Order], product_count: usize) -> DashboardStats {
    let revenue = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Delivered)
        .map(|o| o.total)
        .sum();

    let pending_orders = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Pending)
        .count();

    let customers = orders
        .iter()
        .map(|o| &o.customer_email)
        .collect::<std::collections::HashSet<_>>()
        .len();

    DashboardStats {
        revenue,
        pending_orders,
        customers,
        products: product_count,
    }
}

/// The newest orders, newest first.
#[must_use]
pub fn recent_orders(orders: &[Order], limit: usize) -> Vec<&Order> {
    let mut sorted: Vec<&Order> = orders.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.truncate(limit);
    sorted
}

/// One customer as seen through their orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerSummary {
    pub email: Email,
    /// Name on the customer's most recent order.
    pub name: String,
    pub order_count: usize,
    pub last_order: DateTime<Utc>,
}

/// Group orders by email, most recently active customer first.
#[must_use]
pub fn customer_summaries(orders: &[Order]) -> Vec<CustomerSummary> {
    let mut by_email: HashMap<&Email, CustomerSummary> = HashMap::new();

    for order in orders {
        by_email
            .entry(&order.customer_email)
            .and_modify(|summary| {
                summary.order_count += 1;
                if order.created_at > summary.last_order {
                    summary.last_order = order.created_at;
                    summary.name.clone_from(&order.customer_name);
                }
            })
            .or_insert_with(|| CustomerSummary {
                email: order.customer_email.clone(),
                name: order.customer_name.clone(),
                order_count: 1,
                last_order: order.created_at,
            });
    }

    let mut summaries: Vec<CustomerSummary> = by_email.into_values().collect();
    summaries.sort_by(|a, b| {
        b.last_order
            .cmp(&a.last_order)
            .then_with(|| a.email.cmp(&b.email))
    });
    summaries
}
