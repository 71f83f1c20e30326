//! Read-only aggregate views for the dashboard and report endpoints

use serde::{Deserialize, Serialize};

use super::expense::ExpenseWithCategory;
use super::order::OrderWithCustomer;

/// Count + money sum over some window
#[derive(Debug, Clone, Copy, Serialize, sqlx::FromRow)]
pub struct CountAmount {
    pub count: i64,
    pub amount: f64,
}

/// Top-seller row on the dashboard
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct HotProduct {
    pub id: i64,
    pub name: String,
    pub photo: Option<String>,
    pub total_quantity: i64,
    pub total_amount: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub today: CountAmount,
    pub week: CountAmount,
    pub month: CountAmount,
    pub unpaid_amount: f64,
    pub today_expense: CountAmount,
    pub week_expense: CountAmount,
    pub month_expense: CountAmount,
    pub recent_orders: Vec<OrderWithCustomer>,
    pub hot_products: Vec<HotProduct>,
    pub recent_expenses: Vec<ExpenseWithCategory>,
}

/// One bucket of the grouped sales series
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SalesPoint {
    pub date: String,
    pub order_count: i64,
    pub total_amount: f64,
    pub paid_amount: f64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductSalesRow {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub total_quantity: i64,
    pub total_amount: f64,
    pub order_count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CustomerSalesRow {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub order_count: i64,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub unpaid_amount: f64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ReceivableRow {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub order_count: i64,
    pub unpaid_amount: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receivables {
    pub receivables: Vec<ReceivableRow>,
    pub total_unpaid: f64,
}

/// One bucket of the grouped expense series
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ExpensePoint {
    pub date: String,
    pub expense_count: i64,
    pub total_amount: f64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CategoryExpenseRow {
    pub id: i64,
    pub name: String,
    pub expense_count: i64,
    pub total_amount: f64,
}

/// Date range plus bucket size (`day`, `month` or `year`) for the series endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedRangeQuery {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub group_by: Option<String>,
}

/// Which report sheets to export; absent means all of them
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsExportQuery {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}
