//! Order lifecycle rules.
//!
//! Status changes are unrestricted; only cancellation has preconditions.

use chrono::{DateTime, NaiveTime, Utc};

use dribble_core::OrderStatus;

use super::error::CancelRefusal;
use crate::models::order::{Cancellation, Order};
use crate::models::session::CurrentAdmin;

/// Reason recorded when the caller gives none.
pub const DEFAULT_CANCELLATION_REASON: &str = "Cancelled by admin";

/// Recorded as `cancelled_by_type` for cancellations made here.
pub const CANCELLED_BY_ADMIN: &str = "admin";

/// Check whether `order` may be cancelled.
///
/// # Errors
///
/// Refuses orders that are already cancelled, delivered, or whose parcel the
/// courier has already collected.
pub fn check_cancellable(order: &Order) -> Result<(), CancelRefusal> {
    match order.status {
        OrderStatus::Cancelled => Err(CancelRefusal::AlreadyCancelled),
        OrderStatus::Delivered => Err(CancelRefusal::Delivered),
        _ if order.shipment.as_ref().is_some_and(|s| s.is_with_carrier()) => {
            Err(CancelRefusal::WithCarrier)
        }
        _ => Ok(()),
    }
}

/// The cancellation record for a cancel issued by `actor` at `now`.
#[must_use]
pub fn cancellation(reason: Option<&str>, actor: &CurrentAdmin, now: DateTime<Utc>) -> Cancellation {
    let reason = reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_CANCELLATION_REASON);

    Cancellation {
        reason: reason.to_owned(),
        cancelled_at: now,
        cancelled_by: actor.audit_name(),
        cancelled_by_type: CANCELLED_BY_ADMIN.to_owned(),
    }
}

/// 00:00 UTC of the day containing `now`.
#[must_use]
pub fn start_of_utc_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}
