//! Aggregate reporting queries
//!
//! Everything here is read-only. Cancelled orders are excluded from all
//! revenue figures.

use chrono::{Datelike, Duration, Local};
use shared::models::expense::ExpenseWithCategory;
use shared::models::order::{OrderWithCustomer, STATUS_CANCELLED};
use shared::models::stats::{
    CategoryExpenseRow, CountAmount, CustomerSalesRow, Dashboard, ExpensePoint, GroupedRangeQuery,
    HotProduct, ProductSalesRow, Receivables, SalesPoint,
};
use sqlx::SqlitePool;

use super::filter::Filter;

/// strftime format for a grouping bucket
fn date_format(group_by: Option<&str>) -> &'static str {
    match group_by {
        Some("month") => "%Y-%m",
        Some("year") => "%Y",
        _ => "%Y-%m-%d",
    }
}

async fn order_window(pool: &SqlitePool, clause: &str, date: &str) -> sqlx::Result<CountAmount> {
    let sql = format!(
        "SELECT COUNT(*) AS count, COALESCE(SUM(total_amount), 0.0) AS amount
         FROM orders WHERE {clause} AND status != ?"
    );
    sqlx::query_as(&sql)
        .bind(date)
        .bind(STATUS_CANCELLED)
        .fetch_one(pool)
        .await
}

async fn expense_window(pool: &SqlitePool, clause: &str, date: &str) -> sqlx::Result<CountAmount> {
    let sql = format!(
        "SELECT COUNT(*) AS count, COALESCE(SUM(amount), 0.0) AS amount
         FROM expenses WHERE {clause}"
    );
    sqlx::query_as(&sql).bind(date).fetch_one(pool).await
}

pub async fn dashboard(pool: &SqlitePool) -> sqlx::Result<Dashboard> {
    let now = Local::now();
    let today = now.format("%Y-%m-%d").to_string();
    let week_ago = (now - Duration::days(7)).format("%Y-%m-%d").to_string();
    let month_start = format!("{:04}-{:02}-01", now.year(), now.month());

    let today_orders = order_window(pool, "order_date = ?", &today).await?;
    let week_orders = order_window(pool, "order_date >= ?", &week_ago).await?;
    let month_orders = order_window(pool, "order_date >= ?", &month_start).await?;

    let unpaid_amount: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(total_amount - paid_amount), 0.0)
         FROM orders
         WHERE status != ? AND total_amount > paid_amount",
    )
    .bind(STATUS_CANCELLED)
    .fetch_one(pool)
    .await?;

    let today_expense = expense_window(pool, "expense_date = ?", &today).await?;
    let week_expense = expense_window(pool, "expense_date >= ?", &week_ago).await?;
    let month_expense = expense_window(pool, "expense_date >= ?", &month_start).await?;

    let recent_orders: Vec<OrderWithCustomer> = sqlx::query_as(
        "SELECT o.*, c.name AS customer_name
         FROM orders o
         LEFT JOIN customers c ON o.customer_id = c.id
         ORDER BY o.created_at DESC, o.id DESC LIMIT 10",
    )
    .fetch_all(pool)
    .await?;

    let hot_products: Vec<HotProduct> = sqlx::query_as(
        "SELECT p.id, p.name, p.photo,
                SUM(oi.quantity) AS total_quantity,
                SUM(oi.subtotal) AS total_amount
         FROM order_items oi
         JOIN products p ON oi.product_id = p.id
         JOIN orders o ON oi.order_id = o.id
         WHERE o.status != ?
         GROUP BY p.id
         ORDER BY total_quantity DESC
         LIMIT 5",
    )
    .bind(STATUS_CANCELLED)
    .fetch_all(pool)
    .await?;

    let recent_expenses: Vec<ExpenseWithCategory> = sqlx::query_as(
        "SELECT e.*, ec.name AS category_name
         FROM expenses e
         LEFT JOIN expense_categories ec ON e.category_id = ec.id
         ORDER BY e.created_at DESC, e.id DESC LIMIT 5",
    )
    .fetch_all(pool)
    .await?;

    Ok(Dashboard {
        today: today_orders,
        week: week_orders,
        month: month_orders,
        unpaid_amount,
        today_expense,
        week_expense,
        month_expense,
        recent_orders,
        hot_products,
        recent_expenses,
    })
}

fn range_filter(column: &str, start: Option<&str>, end: Option<&str>) -> Filter {
    let mut filter = Filter::new();
    if let Some(start) = start.filter(|s| !s.is_empty()) {
        filter.push(format!("{column} >= ?"), start);
    }
    if let Some(end) = end.filter(|s| !s.is_empty()) {
        filter.push(format!("{column} <= ?"), end);
    }
    filter
}

/// Revenue per day/month/year bucket
pub async fn sales(pool: &SqlitePool, query: &GroupedRangeQuery) -> sqlx::Result<Vec<SalesPoint>> {
    let fmt = date_format(query.group_by.as_deref());
    let filter = range_filter("order_date", query.start_date.as_deref(), query.end_date.as_deref());

    let sql = format!(
        "SELECT strftime('{fmt}', order_date) AS date,
                COUNT(*) AS order_count,
                COALESCE(SUM(total_amount), 0.0) AS total_amount,
                COALESCE(SUM(paid_amount), 0.0) AS paid_amount
         FROM orders
         WHERE status != ?{}
         GROUP BY strftime('{fmt}', order_date)
         ORDER BY date DESC",
        filter.sql()
    );
    filter
        .bind_as(sqlx::query_as(&sql).bind(STATUS_CANCELLED))
        .fetch_all(pool)
        .await
}

/// Sales per product over the range; products with no sales still appear
pub async fn products(
    pool: &SqlitePool,
    query: &GroupedRangeQuery,
) -> sqlx::Result<Vec<ProductSalesRow>> {
    let mut filter = Filter::new();
    if let Some(start) = query.start_date.as_deref().filter(|s| !s.is_empty()) {
        filter.push("(o.order_date >= ? OR o.order_date IS NULL)", start);
    }
    if let Some(end) = query.end_date.as_deref().filter(|s| !s.is_empty()) {
        filter.push("(o.order_date <= ? OR o.order_date IS NULL)", end);
    }

    let sql = format!(
        "SELECT p.id, p.name, p.category,
                COALESCE(SUM(oi.quantity), 0) AS total_quantity,
                COALESCE(SUM(oi.subtotal), 0.0) AS total_amount,
                COUNT(DISTINCT oi.order_id) AS order_count
         FROM products p
         LEFT JOIN order_items oi ON p.id = oi.product_id
         LEFT JOIN orders o ON oi.order_id = o.id AND o.status != ?
         WHERE 1=1{}
         GROUP BY p.id
         ORDER BY total_amount DESC",
        filter.sql()
    );
    filter
        .bind_as(sqlx::query_as(&sql).bind(STATUS_CANCELLED))
        .fetch_all(pool)
        .await
}

/// Spend per customer over the range; customers with no orders still appear
pub async fn customers(
    pool: &SqlitePool,
    query: &GroupedRangeQuery,
) -> sqlx::Result<Vec<CustomerSalesRow>> {
    let filter = range_filter(
        "o.order_date",
        query.start_date.as_deref(),
        query.end_date.as_deref(),
    );

    // range clauses live in the join condition so unmatched customers survive
    let sql = format!(
        "SELECT c.id, c.name, c.phone,
                COUNT(o.id) AS order_count,
                COALESCE(SUM(o.total_amount), 0.0) AS total_amount,
                COALESCE(SUM(o.paid_amount), 0.0) AS paid_amount,
                COALESCE(SUM(o.total_amount - o.paid_amount), 0.0) AS unpaid_amount
         FROM customers c
         LEFT JOIN orders o ON c.id = o.customer_id AND o.status != ?{}
         GROUP BY c.id
         ORDER BY total_amount DESC",
        filter.sql()
    );
    filter
        .bind_as(sqlx::query_as(&sql).bind(STATUS_CANCELLED))
        .fetch_all(pool)
        .await
}

/// Customers owing money, largest debt first
pub async fn receivables(pool: &SqlitePool) -> sqlx::Result<Receivables> {
    let rows: Vec<shared::models::stats::ReceivableRow> = sqlx::query_as(
        "SELECT c.id, c.name, c.phone,
                COUNT(o.id) AS order_count,
                SUM(o.total_amount - o.paid_amount) AS unpaid_amount
         FROM customers c
         JOIN orders o ON c.id = o.customer_id
         WHERE o.total_amount > o.paid_amount AND o.status != ?
         GROUP BY c.id
         HAVING unpaid_amount > 0
         ORDER BY unpaid_amount DESC",
    )
    .bind(STATUS_CANCELLED)
    .fetch_all(pool)
    .await?;

    let total_unpaid = rows.iter().map(|r| r.unpaid_amount).sum();
    Ok(Receivables {
        receivables: rows,
        total_unpaid,
    })
}

/// Expense totals per day/month/year bucket
pub async fn expenses(
    pool: &SqlitePool,
    query: &GroupedRangeQuery,
) -> sqlx::Result<Vec<ExpensePoint>> {
    let fmt = date_format(query.group_by.as_deref());
    let filter = range_filter(
        "expense_date",
        query.start_date.as_deref(),
        query.end_date.as_deref(),
    );

    let sql = format!(
        "SELECT strftime('{fmt}', expense_date) AS date,
                COUNT(*) AS expense_count,
                COALESCE(SUM(amount), 0.0) AS total_amount
         FROM expenses
         WHERE 1=1{}
         GROUP BY strftime('{fmt}', expense_date)
         ORDER BY date DESC",
        filter.sql()
    );
    filter.bind_as(sqlx::query_as(&sql)).fetch_all(pool).await
}

/// Expense totals per category; empty categories still appear
pub async fn expense_categories(
    pool: &SqlitePool,
    query: &GroupedRangeQuery,
) -> sqlx::Result<Vec<CategoryExpenseRow>> {
    let filter = range_filter(
        "e.expense_date",
        query.start_date.as_deref(),
        query.end_date.as_deref(),
    );

    let sql = format!(
        "SELECT ec.id, ec.name,
                COUNT(e.id) AS expense_count,
                COALESCE(SUM(e.amount), 0.0) AS total_amount
         FROM expense_categories ec
         LEFT JOIN expenses e ON ec.id = e.category_id{}
         GROUP BY ec.id
         ORDER BY total_amount DESC",
        filter.sql()
    );
    filter.bind_as(sqlx::query_as(&sql)).fetch_all(pool).await
}

/// Daily sales rows for the report spreadsheet (always day granularity)
pub async fn sales_by_day(
    pool: &SqlitePool,
    start: Option<&str>,
    end: Option<&str>,
) -> sqlx::Result<Vec<SalesPoint>> {
    let filter = range_filter("order_date", start, end);
    let sql = format!(
        "SELECT order_date AS date,
                COUNT(*) AS order_count,
                COALESCE(SUM(total_amount), 0.0) AS total_amount,
                COALESCE(SUM(paid_amount), 0.0) AS paid_amount
         FROM orders
         WHERE status != ?{}
         GROUP BY order_date
         ORDER BY date DESC",
        filter.sql()
    );
    filter
        .bind_as(sqlx::query_as(&sql).bind(STATUS_CANCELLED))
        .fetch_all(pool)
        .await
}
