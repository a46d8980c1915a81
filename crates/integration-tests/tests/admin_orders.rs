//! Integration tests for order queries and cancellation.
//!
//! These tests require a migrated `PostgreSQL` database
//! (`ADMIN_DATABASE_URL`). They drive the order service directly.

#![allow(clippy::unwrap_used)]

use chrono::{Duration, Utc};

use dribble_admin::models::order::{OrderListQuery, Shipment};
use dribble_admin::models::session::CurrentAdmin;
use dribble_admin::services::orders::{CancelRefusal, OrderError, OrderService};
use dribble_core::{AdminRole, AdminUserId, OrderId, OrderStatus};
use dribble_integration_tests::{insert_order, order_fixture, test_pool, unique_tag};

fn actor() -> CurrentAdmin {
    CurrentAdmin {
        id: AdminUserId::generate(),
        email: "ops@dribble.com".to_owned(),
        role: AdminRole::Staff,
    }
}

fn query(status: Option<&str>, search: &str, page: i64, limit: i64) -> OrderListQuery {
    OrderListQuery::from_params(status, Some(search), Some(page), Some(limit))
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_status_buckets() {
    let pool = test_pool().await;
    let tag = unique_tag();
    let now = Utc::now();
    let statuses = [
        OrderStatus::Pending,
        OrderStatus::PaymentPending,
        OrderStatus::Paid,
        OrderStatus::Refunded,
        OrderStatus::PartiallyRefunded,
        OrderStatus::Delivered,
    ];
    for (i, status) in (0u32..).zip(statuses) {
        insert_order(&pool, &order_fixture(&tag, i, status, "Asha Rao", now)).await;
    }

    let orders = OrderService::new(&pool);

    let pending = orders.list(&query(Some("pending"), &tag, 1, 100)).await.unwrap();
    let mut got: Vec<_> = pending.iter().map(|o| o.status).collect();
    got.sort_by_key(|s| s.as_str());
    assert_eq!(got, vec![OrderStatus::PaymentPending, OrderStatus::Pending]);

    let refunded = orders.list(&query(Some("refunded"), &tag, 1, 100)).await.unwrap();
    assert_eq!(refunded.len(), 2);
    assert!(refunded.iter().all(|o| matches!(
        o.status,
        OrderStatus::Refunded | OrderStatus::PartiallyRefunded
    )));

    let all = orders.list(&query(Some("all"), &tag, 1, 100)).await.unwrap();
    assert_eq!(all.len(), statuses.len());

    let unknown = orders.list(&query(Some("teleported"), &tag, 1, 100)).await.unwrap();
    assert!(unknown.is_empty());
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_search_is_case_insensitive_substring() {
    let pool = test_pool().await;
    let tag = unique_tag();
    let now = Utc::now();
    let surname = format!("Sharma{tag}");
    insert_order(&pool, &order_fixture(&tag, 1, OrderStatus::Paid, &format!("Rohit {surname}"), now)).await;
    insert_order(&pool, &order_fixture(&tag, 2, OrderStatus::Paid, "Meera Iyer", now)).await;

    let orders = OrderService::new(&pool);
    let found = orders
        .list(&query(None, &surname.to_lowercase(), 1, 100))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert!(found[0].customer_name.ends_with(&surname));

    // Wildcards in the search term are literal.
    let none = orders.list(&query(None, &format!("{tag}%"), 1, 100)).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_pagination_is_newest_first() {
    let pool = test_pool().await;
    let tag = unique_tag();
    let base = Utc::now() - Duration::hours(1);
    for i in 0..25u32 {
        let created = base + Duration::seconds(i64::from(i));
        insert_order(&pool, &order_fixture(&tag, i, OrderStatus::Paid, "Asha Rao", created)).await;
    }

    let orders = OrderService::new(&pool);
    let page = orders.list(&query(None, &tag, 2, 10)).await.unwrap();

    // Newest is sequence 24, so rows 11-20 are sequences 14 down to 5.
    let numbers: Vec<_> = page.iter().map(|o| o.order_number.clone()).collect();
    let expected: Vec<_> = (5..=14u32).rev().map(|i| format!("D-{tag}-{i:04}")).collect();
    assert_eq!(numbers, expected);

    let past_end = orders.list(&query(None, &tag, 4, 10)).await.unwrap();
    assert!(past_end.is_empty());
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_cancel_stamps_order_and_shipment() {
    let pool = test_pool().await;
    let tag = unique_tag();
    let mut order = order_fixture(&tag, 1, OrderStatus::Processing, "Asha Rao", Utc::now());
    order.shipment = Some(Shipment {
        tracking_number: Some("AWB123".to_owned()),
        status: Some("booked".to_owned()),
        is_booked: true,
        ..Shipment::default()
    });
    let order = insert_order(&pool, &order).await;

    let cancelled = OrderService::new(&pool)
        .cancel(order.id, Some("Customer changed mind"), &actor())
        .await
        .unwrap();

    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    let cancellation = cancelled.cancellation.unwrap();
    assert_eq!(cancellation.reason, "Customer changed mind");
    assert_eq!(cancellation.cancelled_by, "ops@dribble.com");
    assert_eq!(cancellation.cancelled_by_type, "admin");
    let shipment = cancelled.shipment.unwrap();
    assert_eq!(shipment.status.as_deref(), Some("cancelled"));
    assert!(shipment.cancelled_at.is_some());
    assert_eq!(shipment.tracking_number.as_deref(), Some("AWB123"));
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_cancel_refusals_leave_order_untouched() {
    let pool = test_pool().await;
    let tag = unique_tag();
    let now = Utc::now();
    let orders = OrderService::new(&pool);

    let delivered = insert_order(&pool, &order_fixture(&tag, 1, OrderStatus::Delivered, "A", now)).await;
    let err = orders.cancel(delivered.id, None, &actor()).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidState(CancelRefusal::Delivered)));
    assert_eq!(orders.get_by_id(delivered.id).await.unwrap(), delivered);

    let mut in_transit = order_fixture(&tag, 2, OrderStatus::Shipped, "B", now);
    in_transit.shipment = Some(Shipment {
        status: Some("in_transit".to_owned()),
        ..Shipment::default()
    });
    let in_transit = insert_order(&pool, &in_transit).await;
    let err = orders.cancel(in_transit.id, None, &actor()).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidState(CancelRefusal::WithCarrier)));

    let paid = insert_order(&pool, &order_fixture(&tag, 3, OrderStatus::Paid, "C", now)).await;
    let first = orders.cancel(paid.id, None, &actor()).await.unwrap();
    assert_eq!(first.cancellation.as_ref().unwrap().reason, "Cancelled by admin");
    let err = orders.cancel(paid.id, None, &actor()).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidState(CancelRefusal::AlreadyCancelled)));
    assert_eq!(orders.get_by_id(paid.id).await.unwrap(), first);
}

#[tokio::test]
#[ignore = "Requires database"]
async fn test_set_status_is_permissive() {
    let pool = test_pool().await;
    let tag = unique_tag();
    let orders = OrderService::new(&pool);
    let order = insert_order(&pool, &order_fixture(&tag, 1, OrderStatus::Delivered, "A", Utc::now())).await;

    let reopened = orders
        .set_status(order.id, OrderStatus::Pending, &actor())
        .await
        .unwrap();
    assert_eq!(reopened.status, OrderStatus::Pending);
    assert!(reopened.updated_at >= order.updated_at);

    let err = orders
        .set_status(OrderId::generate(), OrderStatus::Paid, &actor())
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::NotFound));
}
