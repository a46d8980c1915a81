//! Order domain types.
//!
//! Field names on the wire follow the storefront apps that create orders
//! (`pincode`, `gst_rate`, `razorpay_*`, `awb_number`), so the serde renames
//! below are part of the API contract.

use std::num::NonZeroU32;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dribble_core::{Amount, OrderId, OrderStatus, StatusFilter};

/// An order with its embedded address, line items and shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Human-facing number, `D-<shopId>-<DDMMYYYY>-<sequence>`.
    pub order_number: String,
    pub customer_id: Option<String>,
    pub shop_customer_id: Option<String>,
    pub customer_email: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub shipping_address: ShippingAddress,
    pub items: Vec<OrderItem>,
    pub subtotal: Amount,
    pub tax: Amount,
    pub shipping_cost: Amount,
    /// Expected to equal `subtotal + tax + shipping_cost`; not enforced.
    pub total_amount: Amount,
    pub status: OrderStatus,
    #[serde(flatten)]
    pub payment: PaymentDetails,
    pub order_notes: Option<String>,
    /// Courier quote chosen at checkout. Passed through untouched.
    pub selected_courier: Option<serde_json::Value>,
    pub shipment: Option<Shipment>,
    pub estimated_weight: Option<f64>,
    pub inventory_deducted: bool,
    #[serde(flatten)]
    pub cancellation: Option<Cancellation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Delivery address and contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub person_name: String,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(rename = "gst_number", default)]
    pub tax_id: Option<String>,
    pub address: String,
    pub state: String,
    pub city: String,
    #[serde(rename = "pincode")]
    pub postal_code: String,
    #[serde(rename = "mobile_1")]
    pub phone: String,
    #[serde(rename = "mobile_2", default)]
    pub alt_phone: Option<String>,
    #[serde(rename = "email_1", default)]
    pub email: Option<String>,
    #[serde(rename = "email_2", default)]
    pub alt_email: Option<String>,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    "India".to_owned()
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub inventory_id: String,
    pub sku: String,
    pub name: String,
    pub color: String,
    pub size: String,
    /// Unit price.
    pub price: Amount,
    pub quantity: NonZeroU32,
    /// Tax rate in percent.
    #[serde(rename = "gst_rate", default = "default_tax_rate")]
    pub tax_rate: f64,
    /// Product classification code (HSN).
    #[serde(rename = "hsn_code", default)]
    pub classification_code: Option<String>,
    /// Shipping weight in kilograms.
    #[serde(default = "default_shipping_weight")]
    pub shipping_weight: f64,
}

const fn default_tax_rate() -> f64 {
    5.0
}

const fn default_shipping_weight() -> f64 {
    0.5
}

/// Payment gateway references. Opaque to this service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetails {
    #[serde(rename = "razorpay_order_id", default)]
    pub gateway_order_id: Option<String>,
    #[serde(rename = "razorpay_payment_id", default)]
    pub gateway_payment_id: Option<String>,
    #[serde(rename = "razorpay_signature", default)]
    pub gateway_signature: Option<String>,
    #[serde(rename = "payment_gateway", default)]
    pub gateway: Option<String>,
    #[serde(rename = "payment_method", default)]
    pub method: Option<String>,
    #[serde(rename = "payment_method_details", default)]
    pub method_details: Option<serde_json::Value>,
    #[serde(rename = "payment_mode", default)]
    pub mode: Option<String>,
}

/// Courier booking embedded in an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shipment {
    #[serde(rename = "awb_number")]
    pub tracking_number: Option<String>,
    pub carrier_name: Option<String>,
    pub carrier_mode: Option<String>,
    pub estimated_days: Option<String>,
    /// Free-form courier status (`booked`, `picked_up`, `in_transit`, ...).
    pub status: Option<String>,
    #[serde(rename = "is_shipmozo_booked")]
    pub is_booked: bool,
    #[serde(rename = "shipmozo_order_id")]
    pub booking_id: Option<String>,
    pub booked_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Shipment {
    /// Courier statuses meaning the parcel has left the warehouse.
    pub const WITH_CARRIER: &'static [&'static str] = &["in_transit", "picked_up"];

    /// Whether the courier already holds the parcel.
    #[must_use]
    pub fn is_with_carrier(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| Self::WITH_CARRIER.contains(&s))
    }
}

/// Who cancelled an order, when and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancellation {
    #[serde(rename = "cancellation_reason")]
    pub reason: String,
    pub cancelled_at: DateTime<Utc>,
    pub cancelled_by: String,
    pub cancelled_by_type: String,
}

/// Aggregate order counts for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderStats {
    pub total_orders: i64,
    /// Pending and payment-pending combined.
    pub pending_orders: i64,
    pub paid_orders: i64,
    pub shipped_orders: i64,
    pub delivered_orders: i64,
    pub cancelled_orders: i64,
    /// Orders created since 00:00 UTC today.
    pub today_orders: i64,
}

/// 1-indexed page window over the newest-first order list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Pagination {
    pub const DEFAULT_LIMIT: u32 = 100;
    pub const MAX_LIMIT: u32 = 500;

    /// Build from raw query values. Pages below 1 become 1; the limit is
    /// clamped to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.unwrap_or(1).clamp(1, i64::from(u32::MAX));
        let limit = limit
            .unwrap_or(i64::from(Self::DEFAULT_LIMIT))
            .clamp(1, i64::from(Self::MAX_LIMIT));
        Self {
            page: u32::try_from(page).unwrap_or(1),
            limit: u32::try_from(limit).unwrap_or(Self::DEFAULT_LIMIT),
        }
    }

    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Rows to skip: `(page - 1) * limit`.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Everything the order list can be narrowed by.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderListQuery {
    pub status: StatusFilter,
    /// Case-insensitive substring matched against order number, customer
    /// name, phone and email.
    pub search: Option<String>,
    pub pagination: Pagination,
}

impl OrderListQuery {
    /// Resolve raw query-string values.
    #[must_use]
    pub fn from_params(
        status: Option<&str>,
        search: Option<&str>,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Self {
        Self {
            status: StatusFilter::parse(status),
            search: search.filter(|s| !s.is_empty()).map(str::to_owned),
            pagination: Pagination::new(page, limit),
        }
    }
}
