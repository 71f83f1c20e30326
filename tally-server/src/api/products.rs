//! Product endpoints
//!
//! Create and update take multipart form data so a photo can ride along
//! with the fields. The photo file is processed before anything is stored;
//! a `photo` text field passes an existing URL through unchanged.

use axum::Router;
use axum::extract::{Multipart, Path, Query, State};
use axum::routing::get;
use shared::AppError;
use shared::models::order::DateRangeQuery;
use shared::models::product::{
    PriceChange, Product, ProductForm, ProductListQuery, ProductOrderRow, ProductStats,
};
use shared::response::{PageQuery, Paginated};

use super::{ApiResult, message};
use crate::db;
use crate::services::image;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/categories", get(categories))
        .route("/{id}", get(get_one).put(update).delete(remove))
        .route("/{id}/orders", get(orders_for))
        .route("/{id}/stats", get(stats_for))
        .route("/{id}/price-history", get(price_history))
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

async fn parse_form(state: &AppState, mut multipart: Multipart) -> Result<ProductForm, AppError> {
    let mut form = ProductForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "photo" if field.file_name().is_some() => {
                let data = field.bytes().await?;
                if !data.is_empty() {
                    let file = image::save(&state.config.upload_dir, &data)?;
                    form.photo = Some(file.url);
                }
            }
            "photo" => form.photo = non_empty(field.text().await?),
            "name" => form.name = Some(field.text().await?),
            "category" => form.category = non_empty(field.text().await?),
            "spec" => form.spec = non_empty(field.text().await?),
            "unit" => form.unit = non_empty(field.text().await?),
            "description" => form.description = non_empty(field.text().await?),
            "unit_price" => {
                let text = field.text().await?;
                form.unit_price = Some(
                    text.trim()
                        .parse()
                        .map_err(|_| AppError::validation("unit_price must be a number"))?,
                );
            }
            _ => {}
        }
    }
    form.validate()?;
    Ok(form)
}

async fn list(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(query): Query<ProductListQuery>,
) -> ApiResult<axum::Json<Paginated<Product>>> {
    let (rows, total) = db::products::list(&state.pool, &query, &page).await?;
    Ok(axum::Json(Paginated::new(rows, total, &page)))
}

async fn categories(State(state): State<AppState>) -> ApiResult<axum::Json<Vec<String>>> {
    Ok(axum::Json(db::products::categories(&state.pool).await?))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<axum::Json<Product>> {
    let product = db::products::get(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("product not found"))?;
    Ok(axum::Json(product))
}

async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(axum::http::StatusCode, axum::Json<Product>)> {
    let form = parse_form(&state, multipart).await?;
    let product = db::products::create(&state.pool, &form).await?;
    Ok((axum::http::StatusCode::CREATED, axum::Json(product)))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> ApiResult<axum::Json<Product>> {
    let form = parse_form(&state, multipart).await?;
    let product = db::products::update(&state.pool, id, &form)
        .await?
        .ok_or_else(|| AppError::not_found("product not found"))?;
    Ok(axum::Json(product))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<axum::Json<serde_json::Value>> {
    if db::products::delete(&state.pool, id).await? == 0 {
        return Err(AppError::not_found("product not found"));
    }
    Ok(message("deleted"))
}

async fn orders_for(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(range): Query<DateRangeQuery>,
) -> ApiResult<axum::Json<Vec<ProductOrderRow>>> {
    if db::products::get(&state.pool, id).await?.is_none() {
        return Err(AppError::not_found("product not found"));
    }
    Ok(axum::Json(
        db::products::orders_for(&state.pool, id, &range).await?,
    ))
}

async fn stats_for(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<axum::Json<ProductStats>> {
    if db::products::get(&state.pool, id).await?.is_none() {
        return Err(AppError::not_found("product not found"));
    }
    Ok(axum::Json(db::products::stats_for(&state.pool, id).await?))
}

async fn price_history(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<axum::Json<Vec<PriceChange>>> {
    if db::products::get(&state.pool, id).await?.is_none() {
        return Err(AppError::not_found("product not found"));
    }
    Ok(axum::Json(
        db::products::price_history(&state.pool, id).await?,
    ))
}
