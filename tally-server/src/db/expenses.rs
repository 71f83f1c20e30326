//! Expense and expense-category database operations

use shared::models::expense::{
    CategoryPayload, DEFAULT_PAYMENT_METHOD, Expense, ExpenseCategory, ExpenseListQuery,
    ExpensePayload, ExpenseWithCategory,
};
use shared::response::PageQuery;
use sqlx::SqlitePool;

use super::filter::Filter;
use super::{generate_no, today};

fn list_filter(query: &ExpenseListQuery) -> Filter {
    let mut filter = Filter::new();
    if let Some(start) = query.start_date.as_deref().filter(|s| !s.is_empty()) {
        filter.push("e.expense_date >= ?", start);
    }
    if let Some(end) = query.end_date.as_deref().filter(|s| !s.is_empty()) {
        filter.push("e.expense_date <= ?", end);
    }
    if let Some(category_id) = query.category_id {
        filter.push("e.category_id = ?", category_id);
    }
    if let Some(method) = query.payment_method.as_deref().filter(|s| !s.is_empty()) {
        filter.push("e.payment_method = ?", method);
    }
    if let Some(keyword) = query.keyword.as_deref().filter(|s| !s.is_empty()) {
        filter.keyword(&["e.expense_no", "e.payee", "e.note"], keyword);
    }
    filter
}

pub async fn list(
    pool: &SqlitePool,
    query: &ExpenseListQuery,
    page: &PageQuery,
) -> sqlx::Result<(Vec<ExpenseWithCategory>, i64)> {
    let filter = list_filter(query);

    let count_sql = format!(
        "SELECT COUNT(*) FROM expenses e WHERE 1=1{}",
        filter.sql()
    );
    let total: i64 = filter
        .bind_scalar(sqlx::query_scalar(&count_sql))
        .fetch_one(pool)
        .await?;

    let data_sql = format!(
        "SELECT e.*, ec.name AS category_name
         FROM expenses e
         LEFT JOIN expense_categories ec ON e.category_id = ec.id
         WHERE 1=1{}
         ORDER BY e.expense_date DESC, e.id DESC
         LIMIT ? OFFSET ?",
        filter.sql()
    );
    let rows = filter
        .bind_as(sqlx::query_as::<_, ExpenseWithCategory>(&data_sql))
        .bind(page.page_size())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

    Ok((rows, total))
}

pub async fn get(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<ExpenseWithCategory>> {
    sqlx::query_as(
        "SELECT e.*, ec.name AS category_name
         FROM expenses e
         LEFT JOIN expense_categories ec ON e.category_id = ec.id
         WHERE e.id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn create(pool: &SqlitePool, payload: &ExpensePayload) -> sqlx::Result<Expense> {
    let result = sqlx::query(
        "INSERT INTO expenses (expense_no, category_id, amount, expense_date, payee, payment_method, note, attachment)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(generate_no("EXP"))
    .bind(payload.category_id)
    .bind(payload.amount)
    .bind(payload.expense_date.clone().unwrap_or_else(today))
    .bind(&payload.payee)
    .bind(payload.payment_method.as_deref().unwrap_or(DEFAULT_PAYMENT_METHOD))
    .bind(&payload.note)
    .bind(&payload.attachment)
    .execute(pool)
    .await?;

    sqlx::query_as("SELECT * FROM expenses WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(pool)
        .await
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    payload: &ExpensePayload,
) -> sqlx::Result<Option<Expense>> {
    let result = sqlx::query(
        "UPDATE expenses
         SET category_id = ?, amount = ?, expense_date = COALESCE(?, expense_date),
             payee = ?, payment_method = ?, note = ?, attachment = ?
         WHERE id = ?",
    )
    .bind(payload.category_id)
    .bind(payload.amount)
    .bind(&payload.expense_date)
    .bind(&payload.payee)
    .bind(payload.payment_method.as_deref().unwrap_or(DEFAULT_PAYMENT_METHOD))
    .bind(&payload.note)
    .bind(&payload.attachment)
    .bind(id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }
    sqlx::query_as("SELECT * FROM expenses WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn delete(pool: &SqlitePool, id: i64) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM expenses WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Same predicates as [`list`], without pagination, for spreadsheet export
pub async fn export_rows(
    pool: &SqlitePool,
    query: &ExpenseListQuery,
) -> sqlx::Result<Vec<ExpenseWithCategory>> {
    let filter = list_filter(query);
    let sql = format!(
        "SELECT e.*, ec.name AS category_name
         FROM expenses e
         LEFT JOIN expense_categories ec ON e.category_id = ec.id
         WHERE 1=1{}
         ORDER BY e.expense_date DESC, e.id DESC",
        filter.sql()
    );
    filter.bind_as(sqlx::query_as(&sql)).fetch_all(pool).await
}

pub async fn categories(pool: &SqlitePool) -> sqlx::Result<Vec<ExpenseCategory>> {
    sqlx::query_as("SELECT * FROM expense_categories ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn create_category(
    pool: &SqlitePool,
    payload: &CategoryPayload,
) -> sqlx::Result<ExpenseCategory> {
    let result = sqlx::query("INSERT INTO expense_categories (name, icon) VALUES (?, ?)")
        .bind(payload.name.trim())
        .bind(&payload.icon)
        .execute(pool)
        .await?;

    sqlx::query_as("SELECT * FROM expense_categories WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(pool)
        .await
}

pub async fn delete_category(pool: &SqlitePool, id: i64) -> sqlx::Result<u64> {
    // expenses keep their row; category_id goes NULL via ON DELETE SET NULL
    let result = sqlx::query("DELETE FROM expense_categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
