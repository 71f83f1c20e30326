//! Order endpoints

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{get, patch, post};
use serde_json::json;
use shared::AppError;
use shared::models::order::{
    BatchIds, BatchStatus, ORDER_STATUSES, Order, OrderDetail, OrderListQuery, OrderPayload,
    OrderWithCustomer, PaymentPayload, StatusPayload,
};
use shared::models::validate_amount;
use shared::response::{PageQuery, Paginated};

use super::{ApiResult, Json, export, message};
use crate::db;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/export/excel", get(export_excel))
        .route("/batch/delete", post(batch_delete))
        .route("/batch/status", post(batch_status))
        .route("/{id}", get(get_one).put(update).delete(remove))
        .route("/{id}/status", patch(update_status))
        .route("/{id}/payment", patch(update_payment))
}

fn check_status(status: &str) -> Result<(), AppError> {
    if !ORDER_STATUSES.contains(&status) {
        return Err(AppError::validation(format!("unknown status: {status}")));
    }
    Ok(())
}

fn check_ids(ids: &[i64]) -> Result<(), AppError> {
    if ids.is_empty() {
        return Err(AppError::validation("ids must not be empty"));
    }
    Ok(())
}

async fn list(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<axum::Json<Paginated<OrderWithCustomer>>> {
    let (rows, total) = db::orders::list(&state.pool, &query, &page).await?;
    Ok(axum::Json(Paginated::new(rows, total, &page)))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<axum::Json<OrderDetail>> {
    let detail = db::orders::get_detail(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("order not found"))?;
    Ok(axum::Json(detail))
}

async fn create(
    State(state): State<AppState>,
    Json(payload): Json<OrderPayload>,
) -> ApiResult<(StatusCode, axum::Json<Order>)> {
    payload.validate()?;
    let order = db::orders::create(&state.pool, &payload).await?;
    Ok((StatusCode::CREATED, axum::Json(order)))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderPayload>,
) -> ApiResult<axum::Json<Order>> {
    payload.validate()?;
    let order = db::orders::update(&state.pool, id, &payload)
        .await?
        .ok_or_else(|| AppError::not_found("order not found"))?;
    Ok(axum::Json(order))
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<StatusPayload>,
) -> ApiResult<axum::Json<Order>> {
    check_status(&payload.status)?;
    let order = db::orders::update_status(&state.pool, id, &payload.status)
        .await?
        .ok_or_else(|| AppError::not_found("order not found"))?;
    Ok(axum::Json(order))
}

async fn update_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<PaymentPayload>,
) -> ApiResult<axum::Json<Order>> {
    validate_amount("paid_amount", payload.paid_amount)?;
    let order = db::orders::update_payment(&state.pool, id, payload.paid_amount)
        .await?
        .ok_or_else(|| AppError::not_found("order not found"))?;
    Ok(axum::Json(order))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<axum::Json<serde_json::Value>> {
    if db::orders::delete(&state.pool, id).await? == 0 {
        return Err(AppError::not_found("order not found"));
    }
    Ok(message("deleted"))
}

async fn batch_delete(
    State(state): State<AppState>,
    Json(payload): Json<BatchIds>,
) -> ApiResult<axum::Json<serde_json::Value>> {
    check_ids(&payload.ids)?;
    let deleted = db::orders::batch_delete(&state.pool, &payload.ids).await?;
    Ok(axum::Json(json!({ "deletedCount": deleted })))
}

async fn batch_status(
    State(state): State<AppState>,
    Json(payload): Json<BatchStatus>,
) -> ApiResult<axum::Json<serde_json::Value>> {
    check_ids(&payload.ids)?;
    check_status(&payload.status)?;
    let updated = db::orders::batch_status(&state.pool, &payload.ids, &payload.status).await?;
    Ok(axum::Json(json!({ "updatedCount": updated })))
}

async fn export_excel(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<Response> {
    let rows = db::orders::export_rows(&state.pool, &query).await?;
    let bytes = export::orders_workbook(&rows)?;
    export::xlsx_response("orders", bytes)
}
