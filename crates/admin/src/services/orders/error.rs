//! Order service error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Why an order cannot be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CancelRefusal {
    #[error("Order is already cancelled")]
    AlreadyCancelled,

    #[error("Cannot cancel a delivered order")]
    Delivered,

    #[error("Cannot cancel - shipment has already been picked up by the courier.")]
    WithCarrier,
}

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// No order has the given ID.
    #[error("Order not found")]
    NotFound,

    /// The order's current state forbids the operation.
    #[error(transparent)]
    InvalidState(#[from] CancelRefusal),

    /// The order kept changing underneath the guarded update.
    #[error("Order changed while it was being updated, please retry")]
    Conflict,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
