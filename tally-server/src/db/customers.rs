//! Customer database operations

use shared::models::customer::{Customer, CustomerListQuery, CustomerPayload, CustomerStats};
use shared::models::order::{DateRangeQuery, Order, STATUS_CANCELLED};
use shared::response::PageQuery;
use sqlx::SqlitePool;

use super::filter::Filter;

pub async fn list(
    pool: &SqlitePool,
    query: &CustomerListQuery,
    page: &PageQuery,
) -> sqlx::Result<(Vec<Customer>, i64)> {
    let mut filter = Filter::new();
    if let Some(keyword) = query.keyword.as_deref().filter(|s| !s.is_empty()) {
        filter.keyword(&["name", "phone", "address"], keyword);
    }

    let count_sql = format!("SELECT COUNT(*) FROM customers WHERE 1=1{}", filter.sql());
    let total: i64 = filter
        .bind_scalar(sqlx::query_scalar(&count_sql))
        .fetch_one(pool)
        .await?;

    let data_sql = format!(
        "SELECT * FROM customers WHERE 1=1{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        filter.sql()
    );
    let rows = filter
        .bind_as(sqlx::query_as::<_, Customer>(&data_sql))
        .bind(page.page_size())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

    Ok((rows, total))
}

pub async fn get(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Customer>> {
    sqlx::query_as("SELECT * FROM customers WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &SqlitePool, payload: &CustomerPayload) -> sqlx::Result<Customer> {
    let result = sqlx::query("INSERT INTO customers (name, phone, address, note) VALUES (?, ?, ?, ?)")
        .bind(payload.name.trim())
        .bind(&payload.phone)
        .bind(&payload.address)
        .bind(&payload.note)
        .execute(pool)
        .await?;

    sqlx::query_as("SELECT * FROM customers WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(pool)
        .await
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    payload: &CustomerPayload,
) -> sqlx::Result<Option<Customer>> {
    let result = sqlx::query("UPDATE customers SET name = ?, phone = ?, address = ?, note = ? WHERE id = ?")
        .bind(payload.name.trim())
        .bind(&payload.phone)
        .bind(&payload.address)
        .bind(&payload.note)
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get(pool, id).await
}

pub async fn delete(pool: &SqlitePool, id: i64) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM customers WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Order history for one customer, optionally restricted by date and status
pub async fn orders_for(
    pool: &SqlitePool,
    id: i64,
    range: &DateRangeQuery,
) -> sqlx::Result<Vec<Order>> {
    let mut filter = Filter::new();
    filter.push("customer_id = ?", id);
    if let Some(start) = range.start_date.as_deref().filter(|s| !s.is_empty()) {
        filter.push("order_date >= ?", start);
    }
    if let Some(end) = range.end_date.as_deref().filter(|s| !s.is_empty()) {
        filter.push("order_date <= ?", end);
    }
    if let Some(status) = range.status.as_deref().filter(|s| !s.is_empty()) {
        filter.push("status = ?", status);
    }

    let sql = format!(
        "SELECT * FROM orders WHERE 1=1{} ORDER BY order_date DESC, id DESC",
        filter.sql()
    );
    filter.bind_as(sqlx::query_as(&sql)).fetch_all(pool).await
}

/// Spend aggregate for one customer, cancelled orders excluded
pub async fn stats_for(pool: &SqlitePool, id: i64) -> sqlx::Result<CustomerStats> {
    sqlx::query_as(
        "SELECT
            COUNT(*) AS order_count,
            COALESCE(SUM(total_amount), 0.0) AS total_amount,
            COALESCE(SUM(paid_amount), 0.0) AS paid_amount,
            COALESCE(SUM(total_amount - paid_amount), 0.0) AS unpaid_amount
         FROM orders
         WHERE customer_id = ? AND status != ?",
    )
    .bind(id)
    .bind(STATUS_CANCELLED)
    .fetch_one(pool)
    .await
}
