//! Order repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use mrshopy_core::order::{Address, NewOrder, Order, OrderItem};
use mrshopy_core::{Email, OrderId, OrderStatus, Price};

use super::RepositoryError;

const ORDER_COLUMNS: &str = "id, customer_name, customer_email, status, total, items, \
     full_name, house_name, city, state, local_area, phone, transaction_id, gift_wrap, \
     customer_notes, created_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    customer_name: String,
    customer_email: String,
    status: String,
    total: Decimal,
    items: Json<Vec<OrderItem>>,
    full_name: String,
    house_name: String,
    city: String,
    state: String,
    local_area: String,
    phone: Option<String>,
    transaction_id: Option<String>,
    gift_wrap: bool,
    customer_notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let customer_email = Email::parse(&row.customer_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in order {}: {e}", row.id))
        })?;
        let status = row.status.parse::<OrderStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid status in order {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            customer_name: row.customer_name,
            customer_email,
            created_at: row.created_at,
            status,
            total: Price::new(row.total),
            items: row.items.0,
            shipping_address: Address {
                full_name: row.full_name,
                house_name: row.house_name,
                city: row.city,
                state: row.state,
                local_area: row.local_area,
            },
            phone: row.phone,
            transaction_id: row.transaction_id,
            gift_wrap: row.gift_wrap,
            customer_notes: row.customer_notes,
        })
    }
}

fn into_orders(rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
    rows.into_iter().map(Order::try_from).collect()
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row no longer parses.
    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM shop.orders ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .fetch_all(self.pool)
            .await?;
        into_orders(rows)
    }

    /// Orders placed with this email, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row no longer parses.
    pub async fn list_for_customer(&self, email: &Email) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders
             WHERE customer_email = $1
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(email.as_str())
            .fetch_all(self.pool)
            .await?;
        into_orders(rows)
    }

    /// Get an order by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row no longer parses.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM shop.orders WHERE id = $1");
        sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .map(Order::try_from)
            .transpose()
    }

    /// Insert a new order with a fresh id and the current time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let sql = format!(
            "INSERT INTO shop.orders (id, customer_name, customer_email, status, total, items,
                 full_name, house_name, city, state, local_area, phone, gift_wrap, customer_notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {ORDER_COLUMNS}"
        );
        let address = &order.shipping_address;
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(OrderId::new_random())
            .bind(&order.customer_name)
            .bind(order.customer_email.as_str())
            .bind(order.status.as_str())
            .bind(order.total.amount())
            .bind(Json(&order.items))
            .bind(&address.full_name)
            .bind(&address.house_name)
            .bind(&address.city)
            .bind(&address.state)
            .bind(&address.local_area)
            .bind(&order.phone)
            .bind(order.gift_wrap)
            .bind(&order.customer_notes)
            .fetch_one(self.pool)
            .await?;
        row.try_into()
    }

    /// Set or clear the payment transaction reference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this id.
    pub async fn set_transaction_id(
        &self,
        id: OrderId,
        transaction_id: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE shop.orders SET transaction_id = $2 WHERE id = $1")
            .bind(id)
            .bind(transaction_id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove an order permanently.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this id.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.orders WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
