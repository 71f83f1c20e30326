//! Order database operations
//!
//! Order writes are transactional: the header and its items commit
//! together or not at all. An update replaces the full item set.

use shared::models::order::{
    Order, OrderDetail, OrderDetailRow, OrderItemRow, OrderListQuery, OrderPayload,
    OrderWithCustomer, STATUS_PENDING,
};
use shared::response::PageQuery;
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::filter::Filter;
use super::{generate_no, today};

fn list_filter(query: &OrderListQuery) -> Filter {
    let mut filter = Filter::new();
    if let Some(start) = query.start_date.as_deref().filter(|s| !s.is_empty()) {
        filter.push("o.order_date >= ?", start);
    }
    if let Some(end) = query.end_date.as_deref().filter(|s| !s.is_empty()) {
        filter.push("o.order_date <= ?", end);
    }
    if let Some(customer_id) = query.customer_id {
        filter.push("o.customer_id = ?", customer_id);
    }
    if let Some(keyword) = query.keyword.as_deref().filter(|s| !s.is_empty()) {
        filter.keyword(&["o.order_no", "c.name"], keyword);
    }
    filter
}

pub async fn list(
    pool: &SqlitePool,
    query: &OrderListQuery,
    page: &PageQuery,
) -> sqlx::Result<(Vec<OrderWithCustomer>, i64)> {
    let filter = list_filter(query);

    let count_sql = format!(
        "SELECT COUNT(*) FROM orders o LEFT JOIN customers c ON o.customer_id = c.id WHERE 1=1{}",
        filter.sql()
    );
    let total: i64 = filter
        .bind_scalar(sqlx::query_scalar(&count_sql))
        .fetch_one(pool)
        .await?;

    let data_sql = format!(
        "SELECT o.*, c.name AS customer_name
         FROM orders o
         LEFT JOIN customers c ON o.customer_id = c.id
         WHERE 1=1{}
         ORDER BY o.order_date DESC, o.id DESC
         LIMIT ? OFFSET ?",
        filter.sql()
    );
    let rows = filter
        .bind_as(sqlx::query_as::<_, OrderWithCustomer>(&data_sql))
        .bind(page.page_size())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

    Ok((rows, total))
}

/// Header plus its items, or None
pub async fn get_detail(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<OrderDetail>> {
    let header: Option<OrderDetailRow> = sqlx::query_as(
        "SELECT o.*, c.name AS customer_name, c.phone AS customer_phone
         FROM orders o
         LEFT JOIN customers c ON o.customer_id = c.id
         WHERE o.id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    let Some(order) = header else {
        return Ok(None);
    };

    let items: Vec<OrderItemRow> = sqlx::query_as(
        "SELECT oi.*, p.name AS product_name, p.spec AS product_spec, p.photo AS product_photo
         FROM order_items oi
         LEFT JOIN products p ON oi.product_id = p.id
         WHERE oi.order_id = ?
         ORDER BY oi.id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Some(OrderDetail { order, items }))
}

async fn insert_items(
    tx: &mut Transaction<'_, Sqlite>,
    order_id: i64,
    payload: &OrderPayload,
) -> sqlx::Result<()> {
    for item in &payload.items {
        sqlx::query(
            "INSERT INTO order_items (order_id, product_id, quantity, unit_price, subtotal, note)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.quantity as f64 * item.unit_price)
        .bind(&item.note)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub async fn create(pool: &SqlitePool, payload: &OrderPayload) -> sqlx::Result<Order> {
    let mut tx = pool.begin().await?;

    let order_no = generate_no("ORD");
    let order_date = payload
        .order_date
        .clone()
        .unwrap_or_else(today);
    let result = sqlx::query(
        "INSERT INTO orders (order_no, customer_id, total_amount, paid_amount, status, order_date, note)
         VALUES (?, ?, ?, 0, ?, ?, ?)",
    )
    .bind(&order_no)
    .bind(payload.customer_id)
    .bind(payload.total_amount())
    .bind(STATUS_PENDING)
    .bind(&order_date)
    .bind(&payload.note)
    .execute(&mut *tx)
    .await?;
    let id = result.last_insert_rowid();

    insert_items(&mut tx, id, payload).await?;
    tx.commit().await?;

    sqlx::query_as("SELECT * FROM orders WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
}

/// Rewrite the header and replace the full item set in one transaction
pub async fn update(pool: &SqlitePool, id: i64, payload: &OrderPayload) -> sqlx::Result<Option<Order>> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "UPDATE orders SET customer_id = ?, total_amount = ?, order_date = COALESCE(?, order_date), note = ?
         WHERE id = ?",
    )
    .bind(payload.customer_id)
    .bind(payload.total_amount())
    .bind(&payload.order_date)
    .bind(&payload.note)
    .bind(id)
    .execute(&mut *tx)
    .await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }

    sqlx::query("DELETE FROM order_items WHERE order_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    insert_items(&mut tx, id, payload).await?;
    tx.commit().await?;

    sqlx::query_as("SELECT * FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update_status(pool: &SqlitePool, id: i64, status: &str) -> sqlx::Result<Option<Order>> {
    let result = sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }
    sqlx::query_as("SELECT * FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update_payment(pool: &SqlitePool, id: i64, paid: f64) -> sqlx::Result<Option<Order>> {
    let result = sqlx::query("UPDATE orders SET paid_amount = ? WHERE id = ?")
        .bind(paid)
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }
    sqlx::query_as("SELECT * FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn delete(pool: &SqlitePool, id: i64) -> sqlx::Result<u64> {
    // items go with the order via ON DELETE CASCADE
    let result = sqlx::query("DELETE FROM orders WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

fn id_placeholders(ids: &[i64]) -> String {
    vec!["?"; ids.len()].join(", ")
}

pub async fn batch_delete(pool: &SqlitePool, ids: &[i64]) -> sqlx::Result<u64> {
    if ids.is_empty() {
        return Ok(0);
    }
    let sql = format!("DELETE FROM orders WHERE id IN ({})", id_placeholders(ids));
    let mut query = sqlx::query(&sql);
    for id in ids {
        query = query.bind(id);
    }
    Ok(query.execute(pool).await?.rows_affected())
}

pub async fn batch_status(pool: &SqlitePool, ids: &[i64], status: &str) -> sqlx::Result<u64> {
    if ids.is_empty() {
        return Ok(0);
    }
    let sql = format!(
        "UPDATE orders SET status = ? WHERE id IN ({})",
        id_placeholders(ids)
    );
    let mut query = sqlx::query(&sql).bind(status);
    for id in ids {
        query = query.bind(id);
    }
    Ok(query.execute(pool).await?.rows_affected())
}

/// Same predicates as [`list`], without pagination, for spreadsheet export
pub async fn export_rows(
    pool: &SqlitePool,
    query: &OrderListQuery,
) -> sqlx::Result<Vec<OrderWithCustomer>> {
    let filter = list_filter(query);
    let sql = format!(
        "SELECT o.*, c.name AS customer_name
         FROM orders o
         LEFT JOIN customers c ON o.customer_id = c.id
         WHERE 1=1{}
         ORDER BY o.order_date DESC, o.id DESC",
        filter.sql()
    );
    filter.bind_as(sqlx::query_as(&sql)).fetch_all(pool).await
}
