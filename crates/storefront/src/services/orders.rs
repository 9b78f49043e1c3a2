//! Order intake and fulfilment.
//!
//! Checkout writes the order first and the customer's remembered address
//! second. The two writes are independent: a failed profile update is logged
//! and the order stands.

use thiserror::Error;
use tracing::instrument;

use mrshopy_core::order::{CheckoutError, CheckoutInput, NewOrder, Order};
use mrshopy_core::{Email, OrderId, ProductId};

use super::live::Collection;
use crate::db::{OrderRepository, ProductRepository, RepositoryError, UserRepository};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Why an order could not be placed.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    #[error(transparent)]
    Invalid(#[from] CheckoutError),

    #[error("product not found")]
    ProductNotFound,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub struct OrderService<'a> {
    state: &'a AppState,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    fn repo(&self) -> OrderRepository<'a> {
        OrderRepository::new(self.state.pool())
    }

    /// Place a cash-on-delivery order for one unit of a product.
    ///
    /// # Errors
    ///
    /// Returns `PlaceOrderError::Invalid` for a blank required field,
    /// `PlaceOrderError::ProductNotFound` if the product was deleted, and
    /// `PlaceOrderError::Repository` if the order insert fails.
    #[instrument(skip(self, user, input), fields(email = %user.email))]
    pub async fn place(
        &self,
        product_id: ProductId,
        user: &CurrentUser,
        input: &CheckoutInput,
    ) -> Result<Order, PlaceOrderError> {
        let details = input.validate()?;
        let product = ProductRepository::new(self.state.pool())
            .get(product_id)
            .await?
            .ok_or(PlaceOrderError::ProductNotFound)?;

        let new_order = NewOrder::direct(
            &product,
            user.email.clone(),
            Some(&user.display_name),
            details,
        );
        let order = self.repo().create(&new_order).await?;
        tracing::info!(order_id = %order.id, total = %order.total, "Order placed");
        self.state.revalidate(Collection::Orders).await;

        if let Err(e) = UserRepository::new(self.state.pool())
            .save_checkout_details(user.id, &new_order.shipping_address, &new_order.phone)
            .await
        {
            tracing::warn!(error = %e, order_id = %order.id, "Could not remember checkout details");
        } else {
            self.state.revalidate(Collection::Profiles).await;
        }

        Ok(order)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        self.repo().list().await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn list_for_customer(&self, email: &Email) -> Result<Vec<Order>, RepositoryError> {
        self.repo().list_for_customer(email).await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        self.repo().get(id).await
    }

    /// Record the payment reference; a blank value clears it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order is gone.
    #[instrument(skip(self))]
    pub async fn set_transaction_id(
        &self,
        id: OrderId,
        transaction_id: &str,
    ) -> Result<(), RepositoryError> {
        let trimmed = transaction_id.trim();
        let value = (!trimmed.is_empty()).then_some(trimmed);
        self.repo().set_transaction_id(id, value).await?;
        tracing::info!(cleared = value.is_none(), "Transaction id updated");
        self.state.revalidate(Collection::Orders).await;
        Ok(())
    }

    /// Complete an order, which removes it for good.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order is gone.
    #[instrument(skip(self))]
    pub async fn complete(&self, id: OrderId) -> Result<(), RepositoryError> {
        self.repo().delete(id).await?;
        tracing::info!("Order completed and removed");
        self.state.revalidate(Collection::Orders).await;
        Ok(())
    }
}
