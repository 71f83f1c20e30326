//! Order writer properties: server-computed totals, full item replacement,
//! all-or-nothing writes.

use std::str::FromStr;

use shared::models::order::{OrderItemInput, OrderListQuery, OrderPayload};
use shared::response::PageQuery;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tally_server::db;

async fn pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    db::MIGRATOR.run(&pool).await.unwrap();
    pool
}

fn item(product_id: Option<i64>, quantity: i64, unit_price: f64) -> OrderItemInput {
    OrderItemInput {
        product_id,
        quantity,
        unit_price,
        note: None,
    }
}

fn payload(items: Vec<OrderItemInput>) -> OrderPayload {
    OrderPayload {
        customer_id: None,
        items,
        order_date: Some("2026-08-25".into()),
        note: None,
    }
}

async fn item_count(pool: &SqlitePool, order_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM order_items WHERE order_id = ?")
        .bind(order_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn total_is_computed_from_items() {
    let pool = pool().await;
    let order = db::orders::create(&pool, &payload(vec![item(None, 3, 10.0), item(None, 2, 7.5)]))
        .await
        .unwrap();

    assert_eq!(order.total_amount, 45.0);
    assert_eq!(order.paid_amount, 0.0);
    assert_eq!(order.status, "待付款");
    assert!(order.order_no.starts_with("ORD"));
    assert_eq!(item_count(&pool, order.id).await, 2);

    let subtotals: Vec<f64> =
        sqlx::query_scalar("SELECT subtotal FROM order_items WHERE order_id = ? ORDER BY id")
            .bind(order.id)
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(subtotals, vec![30.0, 15.0]);
}

#[tokio::test]
async fn update_replaces_items_completely() {
    let pool = pool().await;
    let order = db::orders::create(&pool, &payload(vec![item(None, 1, 5.0), item(None, 2, 3.0)]))
        .await
        .unwrap();

    let updated = db::orders::update(&pool, order.id, &payload(vec![item(None, 4, 2.5)]))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.total_amount, 10.0);
    assert_eq!(item_count(&pool, order.id).await, 1);
}

#[tokio::test]
async fn failed_create_leaves_nothing_behind() {
    let pool = pool().await;
    // second item references a product that does not exist
    let result = db::orders::create(
        &pool,
        &payload(vec![item(None, 1, 5.0), item(Some(9999), 1, 5.0)]),
    )
    .await;
    assert!(result.is_err());

    let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(&pool)
        .await
        .unwrap();
    let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!((orders, items), (0, 0));
}

#[tokio::test]
async fn failed_update_keeps_the_old_items() {
    let pool = pool().await;
    let order = db::orders::create(&pool, &payload(vec![item(None, 2, 6.0)]))
        .await
        .unwrap();

    let result = db::orders::update(&pool, order.id, &payload(vec![item(Some(9999), 1, 1.0)])).await;
    assert!(result.is_err());

    // original item set and total survive the failed replacement
    assert_eq!(item_count(&pool, order.id).await, 1);
    let total: f64 = sqlx::query_scalar("SELECT total_amount FROM orders WHERE id = ?")
        .bind(order.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(total, 12.0);
}

#[tokio::test]
async fn update_of_missing_order_is_none() {
    let pool = pool().await;
    let result = db::orders::update(&pool, 42, &payload(vec![item(None, 1, 1.0)]))
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn delete_cascades_to_items() {
    let pool = pool().await;
    let order = db::orders::create(&pool, &payload(vec![item(None, 1, 5.0)]))
        .await
        .unwrap();

    assert_eq!(db::orders::delete(&pool, order.id).await.unwrap(), 1);
    assert_eq!(item_count(&pool, order.id).await, 0);
}

#[tokio::test]
async fn batch_status_updates_exactly_the_given_ids() {
    let pool = pool().await;
    let a = db::orders::create(&pool, &payload(vec![item(None, 1, 1.0)]))
        .await
        .unwrap();
    let b = db::orders::create(&pool, &payload(vec![item(None, 1, 2.0)]))
        .await
        .unwrap();

    let updated = db::orders::batch_status(&pool, &[a.id], "已付款").await.unwrap();
    assert_eq!(updated, 1);

    let status_b: String = sqlx::query_scalar("SELECT status FROM orders WHERE id = ?")
        .bind(b.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status_b, "待付款");
}

#[tokio::test]
async fn list_filters_by_date_and_keyword() {
    let pool = pool().await;
    let mut early = payload(vec![item(None, 1, 1.0)]);
    early.order_date = Some("2026-01-10".into());
    let mut late = payload(vec![item(None, 1, 1.0)]);
    late.order_date = Some("2026-06-10".into());
    db::orders::create(&pool, &early).await.unwrap();
    let late_order = db::orders::create(&pool, &late).await.unwrap();

    let query = OrderListQuery {
        start_date: Some("2026-03-01".into()),
        end_date: None,
        customer_id: None,
        keyword: None,
    };
    let page = PageQuery::default();
    let (rows, total) = db::orders::list(&pool, &query, &page).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].id, late_order.id);
}
