//! Reporting endpoints, all read-only

use axum::Router;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::get;
use shared::models::stats::{
    CategoryExpenseRow, CustomerSalesRow, Dashboard, ExpensePoint, GroupedRangeQuery,
    ProductSalesRow, Receivables, SalesPoint, StatsExportQuery,
};

use super::{ApiResult, export};
use crate::db;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/sales", get(sales))
        .route("/products", get(products))
        .route("/customers", get(customers))
        .route("/receivables", get(receivables))
        .route("/expenses", get(expenses))
        .route("/expenses/categories", get(expense_categories))
        .route("/export/excel", get(export_excel))
}

async fn dashboard(State(state): State<AppState>) -> ApiResult<axum::Json<Dashboard>> {
    Ok(axum::Json(db::stats::dashboard(&state.pool).await?))
}

async fn sales(
    State(state): State<AppState>,
    Query(query): Query<GroupedRangeQuery>,
) -> ApiResult<axum::Json<Vec<SalesPoint>>> {
    Ok(axum::Json(db::stats::sales(&state.pool, &query).await?))
}

async fn products(
    State(state): State<AppState>,
    Query(query): Query<GroupedRangeQuery>,
) -> ApiResult<axum::Json<Vec<ProductSalesRow>>> {
    Ok(axum::Json(db::stats::products(&state.pool, &query).await?))
}

async fn customers(
    State(state): State<AppState>,
    Query(query): Query<GroupedRangeQuery>,
) -> ApiResult<axum::Json<Vec<CustomerSalesRow>>> {
    Ok(axum::Json(db::stats::customers(&state.pool, &query).await?))
}

async fn receivables(State(state): State<AppState>) -> ApiResult<axum::Json<Receivables>> {
    Ok(axum::Json(db::stats::receivables(&state.pool).await?))
}

async fn expenses(
    State(state): State<AppState>,
    Query(query): Query<GroupedRangeQuery>,
) -> ApiResult<axum::Json<Vec<ExpensePoint>>> {
    Ok(axum::Json(db::stats::expenses(&state.pool, &query).await?))
}

async fn expense_categories(
    State(state): State<AppState>,
    Query(query): Query<GroupedRangeQuery>,
) -> ApiResult<axum::Json<Vec<CategoryExpenseRow>>> {
    Ok(axum::Json(
        db::stats::expense_categories(&state.pool, &query).await?,
    ))
}

/// Report workbook: one sheet per section, or just the requested one
async fn export_excel(
    State(state): State<AppState>,
    Query(query): Query<StatsExportQuery>,
) -> ApiResult<Response> {
    let kind = query.kind.as_deref();
    let start = query.start_date.as_deref();
    let end = query.end_date.as_deref();
    let range = GroupedRangeQuery {
        start_date: query.start_date.clone(),
        end_date: query.end_date.clone(),
        group_by: None,
    };

    let sales = if matches!(kind, None | Some("sales")) {
        Some(db::stats::sales_by_day(&state.pool, start, end).await?)
    } else {
        None
    };
    let products = if matches!(kind, None | Some("products")) {
        Some(db::stats::products(&state.pool, &range).await?)
    } else {
        None
    };
    let customers = if matches!(kind, None | Some("customers")) {
        Some(db::stats::customers(&state.pool, &range).await?)
    } else {
        None
    };

    let bytes = export::report_workbook(
        sales.as_deref(),
        products.as_deref(),
        customers.as_deref(),
    )?;
    export::xlsx_response("report", bytes)
}
