//! Order repository for database operations.
//!
//! Every mutation is a single `UPDATE ... RETURNING`, so an order and its
//! embedded shipment are always written together.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use dribble_core::{Amount, OrderId, OrderStatus};

use super::{RepositoryError, conflict_on_unique};
use crate::models::order::{
    Cancellation, Order, OrderItem, OrderListQuery, OrderStats, PaymentDetails, Shipment,
    ShippingAddress,
};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    order_number: String,
    customer_id: Option<String>,
    shop_customer_id: Option<String>,
    customer_email: String,
    customer_name: String,
    customer_phone: String,
    shipping_address: Json<ShippingAddress>,
    items: Json<Vec<OrderItem>>,
    subtotal: Decimal,
    tax: Decimal,
    shipping_cost: Decimal,
    total_amount: Decimal,
    status: String,
    razorpay_order_id: Option<String>,
    razorpay_payment_id: Option<String>,
    razorpay_signature: Option<String>,
    payment_gateway: Option<String>,
    payment_method: Option<String>,
    payment_method_details: Option<serde_json::Value>,
    payment_mode: Option<String>,
    order_notes: Option<String>,
    selected_courier: Option<serde_json::Value>,
    shipment: Option<Json<Shipment>>,
    estimated_weight: Option<f64>,
    inventory_deducted: bool,
    cancellation_reason: Option<String>,
    cancelled_at: Option<DateTime<Utc>>,
    cancelled_by: Option<String>,
    cancelled_by_type: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn amount(field: &str, value: Decimal) -> Result<Amount, RepositoryError> {
    Amount::new(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid {field} in database: {e}")))
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status: OrderStatus = row.status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid status in database: {e}"))
        })?;

        let cancellation = match (row.cancellation_reason, row.cancelled_at) {
            (Some(reason), Some(cancelled_at)) => Some(Cancellation {
                reason,
                cancelled_at,
                cancelled_by: row.cancelled_by.unwrap_or_default(),
                cancelled_by_type: row.cancelled_by_type.unwrap_or_default(),
            }),
            _ => None,
        };

        Ok(Self {
            id: OrderId::new(row.id),
            order_number: row.order_number,
            customer_id: row.customer_id,
            shop_customer_id: row.shop_customer_id,
            customer_email: row.customer_email,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            shipping_address: row.shipping_address.0,
            items: row.items.0,
            subtotal: amount("subtotal", row.subtotal)?,
            tax: amount("tax", row.tax)?,
            shipping_cost: amount("shipping_cost", row.shipping_cost)?,
            total_amount: amount("total_amount", row.total_amount)?,
            status,
            payment: PaymentDetails {
                gateway_order_id: row.razorpay_order_id,
                gateway_payment_id: row.razorpay_payment_id,
                gateway_signature: row.razorpay_signature,
                gateway: row.payment_gateway,
                method: row.payment_method,
                method_details: row.payment_method_details,
                mode: row.payment_mode,
            },
            order_notes: row.order_notes,
            selected_courier: row.selected_courier,
            shipment: row.shipment.map(|s| s.0),
            estimated_weight: row.estimated_weight,
            inventory_deducted: row.inventory_deducted,
            cancellation,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const ORDER_COLUMNS: &str = "id, order_number, customer_id, shop_customer_id, \
    customer_email, customer_name, customer_phone, shipping_address, items, \
    subtotal, tax, shipping_cost, total_amount, status, \
    razorpay_order_id, razorpay_payment_id, razorpay_signature, payment_gateway, \
    payment_method, payment_method_details, payment_mode, order_notes, \
    selected_courier, shipment, estimated_weight, inventory_deducted, \
    cancellation_reason, cancelled_at, cancelled_by, cancelled_by_type, \
    created_at, updated_at";

/// Escape `LIKE` metacharacters and wrap the term for substring matching.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Build the list query: status filter AND search, newest first, one page.
fn list_query(query: &OrderListQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM admin.orders WHERE TRUE"));

    if let Some(statuses) = query.status.statuses() {
        qb.push(" AND status = ANY(");
        qb.push_bind(statuses);
        qb.push(")");
    }

    if let Some(search) = &query.search {
        let pattern = contains_pattern(search);
        qb.push(" AND (order_number ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR customer_name ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR customer_phone ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR customer_email ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }

    qb.push(" ORDER BY created_at DESC OFFSET ");
    qb.push_bind(query.pagination.offset());
    qb.push(" LIMIT ");
    qb.push_bind(i64::from(query.pagination.limit()));
    qb
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an order by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM admin.orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List one page of orders matching the query, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if any row is invalid.
    pub async fn list(&self, query: &OrderListQuery) -> Result<Vec<Order>, RepositoryError> {
        let rows = list_query(query)
            .build_query_as::<OrderRow>()
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Overwrite the status of an order.
    ///
    /// Returns `None` if the order does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE admin.orders
             SET status = $2, updated_at = GREATEST($3, created_at)
             WHERE id = $1
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .bind(now)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Mark an order cancelled, stamping the cancellation record and, if
    /// the order has a shipment, the shipment's own status.
    ///
    /// The update only applies while the order is still cancellable; `None`
    /// means the order is missing or was delivered, cancelled or picked up
    /// in the meantime.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn cancel(
        &self,
        id: OrderId,
        cancellation: &Cancellation,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE admin.orders
             SET status = $2,
                 updated_at = GREATEST($4, created_at),
                 cancellation_reason = $3,
                 cancelled_at = $4,
                 cancelled_by = $5,
                 cancelled_by_type = $6,
                 shipment = CASE
                     WHEN shipment IS NULL OR jsonb_typeof(shipment) = 'null' THEN shipment
                     ELSE shipment || jsonb_build_object('status', 'cancelled', 'cancelled_at', $4)
                 END
             WHERE id = $1
               AND status <> ALL($7)
               AND COALESCE(shipment->>'status', '') <> ALL($8)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(OrderStatus::Cancelled)
        .bind(&cancellation.reason)
        .bind(cancellation.cancelled_at)
        .bind(&cancellation.cancelled_by)
        .bind(&cancellation.cancelled_by_type)
        .bind(
            OrderStatus::ALL
                .into_iter()
                .filter(OrderStatus::is_terminal)
                .collect::<Vec<_>>(),
        )
        .bind(Shipment::WITH_CARRIER)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Count orders per dashboard bucket in one statement.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self, today_start: DateTime<Utc>) -> Result<OrderStats, RepositoryError> {
        let stats = sqlx::query_as::<_, OrderStats>(
            r"
            SELECT
                COUNT(*) AS total_orders,
                COUNT(*) FILTER (WHERE status = ANY($1)) AS pending_orders,
                COUNT(*) FILTER (WHERE status = 'paid') AS paid_orders,
                COUNT(*) FILTER (WHERE status = 'shipped') AS shipped_orders,
                COUNT(*) FILTER (WHERE status = 'delivered') AS delivered_orders,
                COUNT(*) FILTER (WHERE status = 'cancelled') AS cancelled_orders,
                COUNT(*) FILTER (WHERE created_at >= $2) AS today_orders
            FROM admin.orders
            ",
        )
        .bind(OrderStatus::PENDING_BUCKET)
        .bind(today_start)
        .fetch_one(self.pool)
        .await?;

        Ok(stats)
    }

    /// Insert a complete order record.
    ///
    /// Orders are created by the storefront apps; this is used for imports
    /// and test fixtures.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order number is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(&self, order: &Order) -> Result<Order, RepositoryError> {
        let cancellation = order.cancellation.as_ref();
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO admin.orders ({ORDER_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                     $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30,
                     $31, $32)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.id)
        .bind(&order.order_number)
        .bind(order.customer_id.as_deref())
        .bind(order.shop_customer_id.as_deref())
        .bind(&order.customer_email)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(Json(&order.shipping_address))
        .bind(Json(&order.items))
        .bind(order.subtotal)
        .bind(order.tax)
        .bind(order.shipping_cost)
        .bind(order.total_amount)
        .bind(order.status)
        .bind(order.payment.gateway_order_id.as_deref())
        .bind(order.payment.gateway_payment_id.as_deref())
        .bind(order.payment.gateway_signature.as_deref())
        .bind(order.payment.gateway.as_deref())
        .bind(order.payment.method.as_deref())
        .bind(order.payment.method_details.as_ref())
        .bind(order.payment.mode.as_deref())
        .bind(order.order_notes.as_deref())
        .bind(order.selected_courier.as_ref())
        .bind(order.shipment.as_ref().map(Json))
        .bind(order.estimated_weight)
        .bind(order.inventory_deducted)
        .bind(cancellation.map(|c| c.reason.as_str()))
        .bind(cancellation.map(|c| c.cancelled_at))
        .bind(cancellation.map(|c| c.cancelled_by.as_str()))
        .bind(cancellation.map(|c| c.cancelled_by_type.as_str()))
        .bind(order.created_at)
        .bind(order.updated_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "order number"))?;

        row.try_into()
    }
}
