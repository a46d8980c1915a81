//! Order lifecycle and query service.
//!
//! Every call re-reads the order from the database; nothing is cached
//! between requests. Concurrent status updates are last-write-wins.

mod error;
pub mod lifecycle;

pub use error::{CancelRefusal, OrderError};

use chrono::Utc;
use sqlx::PgPool;

use dribble_core::{OrderId, OrderStatus};

use crate::db::orders::OrderRepository;
use crate::models::order::{Order, OrderListQuery, OrderStats};
use crate::models::session::CurrentAdmin;

/// Guarded cancel attempts before giving up with `OrderError::Conflict`.
const CANCEL_ATTEMPTS: u32 = 2;

/// Order service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
        }
    }

    /// Fetch one order.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if no order has this ID.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Order, OrderError> {
        self.orders.get_by_id(id).await?.ok_or(OrderError::NotFound)
    }

    /// One page of orders matching `query`, newest first. An empty page is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list(&self, query: &OrderListQuery) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list(query).await?)
    }

    /// Set an order's status unconditionally.
    ///
    /// Any status may follow any other. The actor is logged for audit but not
    /// stored on the order.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if no order has this ID.
    pub async fn set_status(
        &self,
        id: OrderId,
        new_status: OrderStatus,
        actor: &CurrentAdmin,
    ) -> Result<Order, OrderError> {
        let current = self.get_by_id(id).await?;

        let updated = self
            .orders
            .set_status(id, new_status, Utc::now())
            .await?
            .ok_or(OrderError::NotFound)?;

        tracing::info!(
            order_id = %id,
            old_status = %current.status,
            new_status = %new_status,
            actor = %actor.audit_name(),
            "Order status changed"
        );
        Ok(updated)
    }

    /// Cancel an order, recording who cancelled it and why.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if no order has this ID and
    /// `OrderError::InvalidState` if it is already cancelled, delivered, or
    /// with the courier. A refused cancel leaves the order untouched.
    /// Returns `OrderError::Conflict` if the order keeps changing between the
    /// read and the guarded update.
    pub async fn cancel(
        &self,
        id: OrderId,
        reason: Option<&str>,
        actor: &CurrentAdmin,
    ) -> Result<Order, OrderError> {
        let mut current = self.get_by_id(id).await?;
        for attempt in 1..=CANCEL_ATTEMPTS {
            lifecycle::check_cancellable(&current)?;

            let cancellation = lifecycle::cancellation(reason, actor, Utc::now());
            if let Some(cancelled) = self.orders.cancel(id, &cancellation).await? {
                tracing::info!(
                    order_id = %id,
                    order_number = %cancelled.order_number,
                    actor = %cancellation.cancelled_by,
                    reason = %cancellation.reason,
                    "Order cancelled"
                );
                return Ok(cancelled);
            }

            // The order changed between the read and the guarded update.
            tracing::debug!(order_id = %id, attempt, "Order changed during cancellation");
            current = self.get_by_id(id).await?;
        }

        lifecycle::check_cancellable(&current)?;
        Err(OrderError::Conflict)
    }

    /// Dashboard counts. `today_orders` counts orders created since 00:00 UTC.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn stats(&self) -> Result<OrderStats, OrderError> {
        let today_start = lifecycle::start_of_utc_day(Utc::now());
        Ok(self.orders.stats(today_start).await?)
    }
}
