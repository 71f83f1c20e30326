//! Expense records, categories, and the aggregates built on them.

use std::str::FromStr;

use shared::models::customer::CustomerPayload;
use shared::models::expense::{CategoryPayload, ExpenseListQuery, ExpensePayload};
use shared::models::order::{OrderItemInput, OrderPayload};
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

fn expense(amount: f64, date: &str) -> ExpensePayload {
    ExpensePayload {
        category_id: None,
        amount,
        expense_date: Some(date.into()),
        payee: None,
        payment_method: None,
        note: None,
        attachment: None,
    }
}

#[tokio::test]
async fn default_categories_are_seeded() {
    let pool = pool().await;
    let categories = db::expenses::categories(&pool).await.unwrap();
    assert_eq!(categories.len(), 8);
    assert!(categories.iter().any(|c| c.name == "采购成本"));
}

#[tokio::test]
async fn create_fills_number_and_payment_defaults() {
    let pool = pool().await;
    let created = db::expenses::create(&pool, &expense(88.0, "2026-08-25"))
        .await
        .unwrap();
    assert!(created.expense_no.starts_with("EXP"));
    assert_eq!(created.payment_method, "现金");
    assert_eq!(created.amount, 88.0);
}

#[tokio::test]
async fn deleting_a_category_keeps_its_expenses() {
    let pool = pool().await;
    let category = db::expenses::create_category(
        &pool,
        &CategoryPayload {
            name: "差旅".into(),
            icon: None,
        },
    )
    .await
    .unwrap();

    let mut payload = expense(50.0, "2026-08-25");
    payload.category_id = Some(category.id);
    let created = db::expenses::create(&pool, &payload).await.unwrap();

    assert_eq!(db::expenses::delete_category(&pool, category.id).await.unwrap(), 1);

    let survivor = db::expenses::get(&pool, created.id).await.unwrap().unwrap();
    assert!(survivor.category_id.is_none());
    assert!(survivor.category_name.is_none());
}

#[tokio::test]
async fn duplicate_category_name_is_a_constraint_error() {
    let pool = pool().await;
    let payload = CategoryPayload {
        name: "税费".into(),
        icon: None,
    };
    // already seeded by the migration
    assert!(db::expenses::create_category(&pool, &payload).await.is_err());
}

#[tokio::test]
async fn list_filters_by_date_range() {
    let pool = pool().await;
    db::expenses::create(&pool, &expense(10.0, "2026-01-05")).await.unwrap();
    db::expenses::create(&pool, &expense(20.0, "2026-06-05")).await.unwrap();

    let query = ExpenseListQuery {
        start_date: Some("2026-03-01".into()),
        end_date: None,
        category_id: None,
        payment_method: None,
        keyword: None,
    };
    let (rows, total) = db::expenses::list(&pool, &query, &PageQuery::default())
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].amount, 20.0);
}

#[tokio::test]
async fn customer_stats_exclude_cancelled_orders() {
    let pool = pool().await;
    let customer = db::customers::create(
        &pool,
        &CustomerPayload {
            name: "张三".into(),
            phone: None,
            address: None,
            note: None,
        },
    )
    .await
    .unwrap();

    let order_for = |price: f64| OrderPayload {
        customer_id: Some(customer.id),
        items: vec![OrderItemInput {
            product_id: None,
            quantity: 1,
            unit_price: price,
            note: None,
        }],
        order_date: Some("2026-08-25".into()),
        note: None,
    };
    let kept = db::orders::create(&pool, &order_for(100.0)).await.unwrap();
    let cancelled = db::orders::create(&pool, &order_for(40.0)).await.unwrap();
    db::orders::update_status(&pool, cancelled.id, "已取消").await.unwrap();
    db::orders::update_payment(&pool, kept.id, 30.0).await.unwrap();

    let stats = db::customers::stats_for(&pool, customer.id).await.unwrap();
    assert_eq!(stats.order_count, 1);
    assert_eq!(stats.total_amount, 100.0);
    assert_eq!(stats.paid_amount, 30.0);
    assert_eq!(stats.unpaid_amount, 70.0);
}

#[tokio::test]
async fn dashboard_receivables_track_unpaid_orders() {
    let pool = pool().await;
    let customer = db::customers::create(
        &pool,
        &CustomerPayload {
            name: "李四".into(),
            phone: None,
            address: None,
            note: None,
        },
    )
    .await
    .unwrap();
    let order = db::orders::create(
        &pool,
        &OrderPayload {
            customer_id: Some(customer.id),
            items: vec![OrderItemInput {
                product_id: None,
                quantity: 2,
                unit_price: 25.0,
                note: None,
            }],
            order_date: None,
            note: None,
        },
    )
    .await
    .unwrap();
    db::orders::update_payment(&pool, order.id, 10.0).await.unwrap();

    let receivables = db::stats::receivables(&pool).await.unwrap();
    assert_eq!(receivables.receivables.len(), 1);
    assert_eq!(receivables.total_unpaid, 40.0);

    let dashboard = db::stats::dashboard(&pool).await.unwrap();
    assert_eq!(dashboard.unpaid_amount, 40.0);
    assert_eq!(dashboard.today.count, 1);
    assert_eq!(dashboard.today.amount, 50.0);
}
