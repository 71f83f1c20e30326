//! Product database operations

use shared::models::order::{DateRangeQuery, STATUS_CANCELLED};
use shared::models::product::{
    PriceChange, Product, ProductForm, ProductListQuery, ProductOrderRow, ProductStats,
};
use shared::response::PageQuery;
use sqlx::SqlitePool;

use super::filter::Filter;

fn list_filter(query: &ProductListQuery) -> Filter {
    let mut filter = Filter::new();
    if let Some(category) = query.category.as_deref().filter(|s| !s.is_empty()) {
        filter.push("category = ?", category);
    }
    if let Some(keyword) = query.keyword.as_deref().filter(|s| !s.is_empty()) {
        filter.keyword(&["name", "spec", "description"], keyword);
    }
    filter
}

pub async fn list(
    pool: &SqlitePool,
    query: &ProductListQuery,
    page: &PageQuery,
) -> sqlx::Result<(Vec<Product>, i64)> {
    let filter = list_filter(query);

    let count_sql = format!("SELECT COUNT(*) FROM products WHERE 1=1{}", filter.sql());
    let total: i64 = filter
        .bind_scalar(sqlx::query_scalar(&count_sql))
        .fetch_one(pool)
        .await?;

    let data_sql = format!(
        "SELECT * FROM products WHERE 1=1{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        filter.sql()
    );
    let rows = filter
        .bind_as(sqlx::query_as::<_, Product>(&data_sql))
        .bind(page.page_size())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

    Ok((rows, total))
}

pub async fn get(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Product>> {
    sqlx::query_as("SELECT * FROM products WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &SqlitePool, form: &ProductForm) -> sqlx::Result<Product> {
    let result = sqlx::query(
        "INSERT INTO products (name, category, spec, unit, unit_price, photo, description)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(form.name.as_deref().unwrap_or_default())
    .bind(&form.category)
    .bind(&form.spec)
    .bind(&form.unit)
    .bind(form.unit_price.unwrap_or(0.0))
    .bind(&form.photo)
    .bind(&form.description)
    .execute(pool)
    .await?;

    sqlx::query_as("SELECT * FROM products WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(pool)
        .await
}

/// Full replace of the editable fields. Appends a price-history row when
/// the price actually changed, in the same transaction as the update.
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    form: &ProductForm,
) -> sqlx::Result<Option<Product>> {
    let mut tx = pool.begin().await?;

    let old: Option<(f64,)> = sqlx::query_as("SELECT unit_price FROM products WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some((old_price,)) = old else {
        return Ok(None);
    };
    let new_price = form.unit_price.unwrap_or(0.0);

    sqlx::query(
        "UPDATE products
         SET name = ?, category = ?, spec = ?, unit = ?, unit_price = ?,
             photo = ?, description = ?, updated_at = datetime('now')
         WHERE id = ?",
    )
    .bind(form.name.as_deref().unwrap_or_default())
    .bind(&form.category)
    .bind(&form.spec)
    .bind(&form.unit)
    .bind(new_price)
    .bind(&form.photo)
    .bind(&form.description)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if new_price != old_price {
        sqlx::query("INSERT INTO price_history (product_id, old_price, new_price) VALUES (?, ?, ?)")
            .bind(id)
            .bind(old_price)
            .bind(new_price)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    get(pool, id).await
}

pub async fn delete(pool: &SqlitePool, id: i64) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Distinct non-empty categories, sorted
pub async fn categories(pool: &SqlitePool) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar(
        "SELECT DISTINCT category FROM products
         WHERE category IS NOT NULL AND category != ''
         ORDER BY category",
    )
    .fetch_all(pool)
    .await
}

pub async fn price_history(pool: &SqlitePool, id: i64) -> sqlx::Result<Vec<PriceChange>> {
    sqlx::query_as(
        "SELECT * FROM price_history WHERE product_id = ? ORDER BY changed_at DESC, id DESC",
    )
    .bind(id)
    .fetch_all(pool)
    .await
}

/// Orders this product appeared in, newest first
pub async fn orders_for(
    pool: &SqlitePool,
    id: i64,
    range: &DateRangeQuery,
) -> sqlx::Result<Vec<ProductOrderRow>> {
    let mut filter = Filter::new();
    filter.push("oi.product_id = ?", id);
    if let Some(start) = range.start_date.as_deref().filter(|s| !s.is_empty()) {
        filter.push("o.order_date >= ?", start);
    }
    if let Some(end) = range.end_date.as_deref().filter(|s| !s.is_empty()) {
        filter.push("o.order_date <= ?", end);
    }

    let sql = format!(
        "SELECT o.id, o.order_no, o.customer_id, o.total_amount, o.paid_amount,
                o.status, o.order_date,
                oi.quantity, oi.unit_price AS item_price, oi.subtotal,
                c.name AS customer_name
         FROM orders o
         JOIN order_items oi ON o.id = oi.order_id
         LEFT JOIN customers c ON o.customer_id = c.id
         WHERE 1=1{}
         ORDER BY o.order_date DESC, o.id DESC",
        filter.sql()
    );
    filter.bind_as(sqlx::query_as(&sql)).fetch_all(pool).await
}

/// Sales aggregate for one product, cancelled orders excluded
pub async fn stats_for(pool: &SqlitePool, id: i64) -> sqlx::Result<ProductStats> {
    sqlx::query_as(
        "SELECT
            COALESCE(SUM(oi.quantity), 0) AS total_quantity,
            COALESCE(SUM(oi.subtotal), 0.0) AS total_amount,
            COALESCE(AVG(oi.unit_price), 0.0) AS avg_price,
            COUNT(DISTINCT oi.order_id) AS order_count
         FROM order_items oi
         JOIN orders o ON oi.order_id = o.id
         WHERE oi.product_id = ? AND o.status != ?",
    )
    .bind(id)
    .bind(STATUS_CANCELLED)
    .fetch_one(pool)
    .await
}
