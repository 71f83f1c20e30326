//! Customer endpoints

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use shared::AppError;
use shared::models::customer::{Customer, CustomerListQuery, CustomerPayload, CustomerStats};
use shared::models::order::{DateRangeQuery, Order};
use shared::response::{PageQuery, Paginated};

use super::{ApiResult, Json, message};
use crate::db;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(remove))
        .route("/{id}/orders", get(orders_for))
        .route("/{id}/stats", get(stats_for))
}

async fn list(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(query): Query<CustomerListQuery>,
) -> ApiResult<axum::Json<Paginated<Customer>>> {
    let (rows, total) = db::customers::list(&state.pool, &query, &page).await?;
    Ok(axum::Json(Paginated::new(rows, total, &page)))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<axum::Json<Customer>> {
    let customer = db::customers::get(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("customer not found"))?;
    Ok(axum::Json(customer))
}

async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CustomerPayload>,
) -> ApiResult<(StatusCode, axum::Json<Customer>)> {
    payload.validate()?;
    let customer = db::customers::create(&state.pool, &payload).await?;
    Ok((StatusCode::CREATED, axum::Json(customer)))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CustomerPayload>,
) -> ApiResult<axum::Json<Customer>> {
    payload.validate()?;
    let customer = db::customers::update(&state.pool, id, &payload)
        .await?
        .ok_or_else(|| AppError::not_found("customer not found"))?;
    Ok(axum::Json(customer))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<axum::Json<serde_json::Value>> {
    if db::customers::delete(&state.pool, id).await? == 0 {
        return Err(AppError::not_found("customer not found"));
    }
    Ok(message("deleted"))
}

async fn orders_for(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(range): Query<DateRangeQuery>,
) -> ApiResult<axum::Json<Vec<Order>>> {
    if db::customers::get(&state.pool, id).await?.is_none() {
        return Err(AppError::not_found("customer not found"));
    }
    Ok(axum::Json(
        db::customers::orders_for(&state.pool, id, &range).await?,
    ))
}

async fn stats_for(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<axum::Json<CustomerStats>> {
    if db::customers::get(&state.pool, id).await?.is_none() {
        return Err(AppError::not_found("customer not found"));
    }
    Ok(axum::Json(db::customers::stats_for(&state.pool, id).await?))
}
