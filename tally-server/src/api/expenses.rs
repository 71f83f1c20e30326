//! Expense and expense-category endpoints

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;
use shared::AppError;
use shared::models::expense::{
    CategoryPayload, Expense, ExpenseCategory, ExpenseListQuery, ExpensePayload,
    ExpenseWithCategory,
};
use shared::response::{PageQuery, Paginated};

use super::{ApiResult, Json, export, message};
use crate::db;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/categories", get(categories).post(create_category))
        .route("/categories/{id}", axum::routing::delete(remove_category))
        .route("/export/excel", get(export_excel))
        .route("/{id}", get(get_one).put(update).delete(remove))
}

async fn list(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(query): Query<ExpenseListQuery>,
) -> ApiResult<axum::Json<Paginated<ExpenseWithCategory>>> {
    let (rows, total) = db::expenses::list(&state.pool, &query, &page).await?;
    Ok(axum::Json(Paginated::new(rows, total, &page)))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<axum::Json<ExpenseWithCategory>> {
    let expense = db::expenses::get(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("expense not found"))?;
    Ok(axum::Json(expense))
}

async fn create(
    State(state): State<AppState>,
    Json(payload): Json<ExpensePayload>,
) -> ApiResult<(StatusCode, axum::Json<Expense>)> {
    payload.validate()?;
    let expense = db::expenses::create(&state.pool, &payload).await?;
    Ok((StatusCode::CREATED, axum::Json(expense)))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ExpensePayload>,
) -> ApiResult<axum::Json<Expense>> {
    payload.validate()?;
    let expense = db::expenses::update(&state.pool, id, &payload)
        .await?
        .ok_or_else(|| AppError::not_found("expense not found"))?;
    Ok(axum::Json(expense))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<axum::Json<serde_json::Value>> {
    if db::expenses::delete(&state.pool, id).await? == 0 {
        return Err(AppError::not_found("expense not found"));
    }
    Ok(message("deleted"))
}

async fn categories(State(state): State<AppState>) -> ApiResult<axum::Json<Vec<ExpenseCategory>>> {
    Ok(axum::Json(db::expenses::categories(&state.pool).await?))
}

async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CategoryPayload>,
) -> ApiResult<(StatusCode, axum::Json<ExpenseCategory>)> {
    payload.validate()?;
    let category = db::expenses::create_category(&state.pool, &payload).await?;
    Ok((StatusCode::CREATED, axum::Json(category)))
}

async fn remove_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<axum::Json<serde_json::Value>> {
    if db::expenses::delete_category(&state.pool, id).await? == 0 {
        return Err(AppError::not_found("category not found"));
    }
    Ok(message("deleted"))
}

async fn export_excel(
    State(state): State<AppState>,
    Query(query): Query<ExpenseListQuery>,
) -> ApiResult<Response> {
    let rows = db::expenses::export_rows(&state.pool, &query).await?;
    let bytes = export::expenses_workbook(&rows)?;
    export::xlsx_response("expenses", bytes)
}
