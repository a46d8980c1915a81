//! Status enums and status filters.
//!
//! Orders move through a small lifecycle of eleven states. The admin console
//! filters on *buckets* of those states: "pending" covers both orders awaiting
//! confirmation and orders awaiting payment, "refunded" covers full and partial
//! refunds.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A status string that is not one of the known values.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(pub String);

/// Order lifecycle status.
///
/// No transition table is enforced; any status may be set to any other via
/// the generic update. Only cancellation has preconditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    PaymentPending,
    Paid,
    Confirmed,
    Processing,
    Shipped,
    OutForDelivery,
    Delivered,
    Cancelled,
    Refunded,
    PartiallyRefunded,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 11] = [
        Self::Pending,
        Self::PaymentPending,
        Self::Paid,
        Self::Confirmed,
        Self::Processing,
        Self::Shipped,
        Self::OutForDelivery,
        Self::Delivered,
        Self::Cancelled,
        Self::Refunded,
        Self::PartiallyRefunded,
    ];

    /// Statuses counted as "pending" by filters and statistics.
    pub const PENDING_BUCKET: &'static [Self] = &[Self::Pending, Self::PaymentPending];

    /// Statuses counted as "refunded" by filters.
    pub const REFUNDED_BUCKET: &'static [Self] = &[Self::Refunded, Self::PartiallyRefunded];

    /// The wire/database representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PaymentPending => "payment_pending",
            Self::Paid => "paid",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::PartiallyRefunded => "partially_refunded",
        }
    }

    /// Delivered and cancelled orders are finished; cancellation refuses them.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_owned()))
    }
}

// Stored as TEXT (guarded by a CHECK constraint), not a Postgres enum.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OrderStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::postgres::PgHasArrayType for OrderStatus {
    fn array_type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::postgres::PgHasArrayType>::array_type_info()
    }
}

/// The `status` query parameter of the order list, resolved to the set of
/// statuses it matches.
///
/// ```
/// use dribble_core::{OrderStatus, StatusFilter};
///
/// let filter = StatusFilter::parse(Some("pending"));
/// assert!(filter.matches(OrderStatus::PaymentPending));
/// assert!(!filter.matches(OrderStatus::Paid));
///
/// assert_eq!(StatusFilter::parse(Some("all")), StatusFilter::Any);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// No status constraint (`status` absent, blank or `all`).
    #[default]
    Any,
    /// A combined bucket matching several statuses.
    Bucket(&'static [OrderStatus]),
    /// Exactly one status.
    Exact(OrderStatus),
    /// A value that names no known status. Matches nothing.
    Unrecognized(String),
}

impl StatusFilter {
    /// Resolve a raw `status` query parameter.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::Any;
        };

        match raw {
            "all" => Self::Any,
            "pending" => Self::Bucket(OrderStatus::PENDING_BUCKET),
            "refunded" => Self::Bucket(OrderStatus::REFUNDED_BUCKET),
            other => other
                .parse()
                .map_or_else(|_| Self::Unrecognized(other.to_owned()), Self::Exact),
        }
    }

    /// The statuses to match, or `None` when unconstrained.
    ///
    /// An unrecognized filter yields an empty set so that it matches no rows.
    #[must_use]
    pub fn statuses(&self) -> Option<Vec<OrderStatus>> {
        match self {
            Self::Any => None,
            Self::Bucket(bucket) => Some(bucket.to_vec()),
            Self::Exact(status) => Some(vec![*status]),
            Self::Unrecognized(_) => Some(Vec::new()),
        }
    }

    /// Whether an order with `status` passes this filter.
    #[must_use]
    pub fn matches(&self, status: OrderStatus) -> bool {
        self.statuses()
            .is_none_or(|statuses| statuses.contains(&status))
    }
}

/// Staff role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "admin.admin_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Full access, including account management through the CLI.
    #[default]
    Admin,
    /// Day-to-day order handling.
    Staff,
    /// Read-only access to orders and statistics.
    Viewer,
}

impl AdminRole {
    /// Whether this role may change order status or cancel orders.
    #[must_use]
    pub const fn can_manage_orders(&self) -> bool {
        matches!(self, Self::Admin | Self::Staff)
    }

    /// The wire/database representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Viewer => "viewer",
        }
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role string that is not one of the known values.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid role: {0} (expected admin, staff or viewer)")]
pub struct UnknownRole(pub String);

impl FromStr for AdminRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "staff" => Ok(Self::Staff),
            "viewer" => Ok(Self::Viewer),
            _ => Err(UnknownRole(s.to_owned())),
        }
    }
}
